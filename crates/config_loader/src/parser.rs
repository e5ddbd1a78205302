//! 配置解析模块
//!
//! TOML 与 JSON 文档统一解析为按节组织的配置树（`serde_json::Map`），
//! 分层合并完成后再反序列化为 `SyncConfig`。

use contracts::{ContractError, SyncConfig};
use serde_json::{Map, Value};

/// 配置树：节名 -> 字段表
pub type ConfigTree = Map<String, Value>;

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
        }
    }
}

/// 默认配置对应的配置树，包含全部节与字段
pub fn defaults() -> Result<ConfigTree, ContractError> {
    match serde_json::to_value(SyncConfig::default()) {
        Ok(Value::Object(tree)) => Ok(tree),
        Ok(_) => Err(ContractError::config_parse("default config is not a table")),
        Err(e) => Err(ContractError::ConfigParse {
            message: format!("cannot build default config tree: {e}"),
            source: Some(Box::new(e)),
        }),
    }
}

/// 解析一份配置文档，顶层必须是表
pub fn parse_document(content: &str, format: ConfigFormat) -> Result<ConfigTree, ContractError> {
    let document: Value = match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| parse_error(format, e))?,
        ConfigFormat::Json => serde_json::from_str(content).map_err(|e| parse_error(format, e))?,
    };
    match document {
        Value::Object(tree) => Ok(tree),
        other => Err(ContractError::config_parse(format!(
            "{} document must be a table of sections, got {other}",
            format.name()
        ))),
    }
}

/// 检查文档中的节与字段都存在于 `known` 中
///
/// 拼写错误的键会被拒绝，而不是被静默忽略。
pub fn check_known(known: &ConfigTree, document: &ConfigTree) -> Result<(), ContractError> {
    for (section, value) in document {
        let Some(Value::Object(fields)) = known.get(section) else {
            return Err(ContractError::config_validation(
                section.as_str(),
                "unknown config section",
            ));
        };
        let Value::Object(entries) = value else {
            return Err(ContractError::config_validation(
                section.as_str(),
                "section must be a table",
            ));
        };
        if let Some(field) = entries.keys().find(|f| !fields.contains_key(*f)) {
            return Err(ContractError::config_validation(
                format!("{section}.{field}"),
                "unknown config field",
            ));
        }
    }
    Ok(())
}

/// 按节合并：`overlay` 中出现的字段覆盖 `base`，其余字段保留
pub fn merge_sections(base: &mut ConfigTree, overlay: ConfigTree) {
    for (section, value) in overlay {
        match (base.get_mut(&section), value) {
            (Some(Value::Object(fields)), Value::Object(updates)) => fields.extend(updates),
            (_, value) => {
                base.insert(section, value);
            }
        }
    }
}

/// 配置树 -> `SyncConfig`
pub fn into_config(tree: ConfigTree) -> Result<SyncConfig, ContractError> {
    serde_json::from_value(Value::Object(tree)).map_err(|e| ContractError::ConfigParse {
        message: format!("config type error: {e}"),
        source: Some(Box::new(e)),
    })
}

fn parse_error<E>(format: ConfigFormat, e: E) -> ContractError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ContractError::ConfigParse {
        message: format!("{} parse error: {e}", format.name()),
        source: Some(Box::new(e)),
    }
}
