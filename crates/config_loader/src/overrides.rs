//! 配置覆盖项
//!
//! 覆盖项在配置文件之后应用，来源有两个：
//! - 环境变量 `BIKE_SYNC__<SECTION>__<FIELD>`，例如 `BIKE_SYNC__SEARCH__TAU_MAX_S=0.4`
//! - 命令行赋值 `section.field=value`，例如 `--set filter.cutoff_hz=40`
//!
//! 同一字段出现多次时，后应用的覆盖先应用的。

use contracts::ContractError;
use serde_json::{Number, Value};

use crate::parser::ConfigTree;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "BIKE_SYNC__";

#[derive(Debug, Clone, PartialEq)]
struct Override {
    section: String,
    field: String,
    value: Value,
    /// 环境变量名或命令行赋值原文
    origin: String,
}

/// 有序的覆盖项集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    entries: Vec<Override>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取进程环境中的 `BIKE_SYNC__*` 变量
    pub fn from_env() -> Result<Self, ContractError> {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// 从键值对中挑出带前缀的变量，键按名称排序后应用
    pub fn from_vars<I>(vars: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        vars.sort();

        let mut overrides = Self::new();
        for (key, raw) in vars {
            let path = &key[ENV_PREFIX.len()..];
            let (section, field) = path.split_once("__").ok_or_else(|| {
                ContractError::config_validation(
                    key.as_str(),
                    format!("expected {ENV_PREFIX}<SECTION>__<FIELD>"),
                )
            })?;
            overrides.push(
                section.to_ascii_lowercase(),
                field.to_ascii_lowercase(),
                &raw,
                key.clone(),
            );
        }
        Ok(overrides)
    }

    /// 追加一条 `section.field=value` 赋值
    pub fn set(&mut self, assignment: &str) -> Result<(), ContractError> {
        let malformed = || {
            ContractError::config_validation(
                assignment,
                "expected SECTION.FIELD=VALUE",
            )
        };
        let (path, raw) = assignment.split_once('=').ok_or_else(malformed)?;
        let (section, field) = path.trim().split_once('.').ok_or_else(malformed)?;
        if section.is_empty() || field.is_empty() {
            return Err(malformed());
        }
        self.push(section.to_string(), field.to_string(), raw, assignment.to_string());
        Ok(())
    }

    /// 合并另一组覆盖项，`other` 在后
    pub fn extend(&mut self, other: ConfigOverrides) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 写入配置树；目标节与字段必须已存在
    pub fn apply(&self, tree: &mut ConfigTree) -> Result<(), ContractError> {
        for entry in &self.entries {
            let fields = tree
                .get_mut(&entry.section)
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    ContractError::config_validation(
                        entry.section.as_str(),
                        format!("unknown config section in override '{}'", entry.origin),
                    )
                })?;
            let slot = fields.get_mut(&entry.field).ok_or_else(|| {
                ContractError::config_validation(
                    format!("{}.{}", entry.section, entry.field),
                    format!("unknown config field in override '{}'", entry.origin),
                )
            })?;
            *slot = entry.value.clone();
        }
        Ok(())
    }

    fn push(&mut self, section: String, field: String, raw: &str, origin: String) {
        self.entries.push(Override {
            section,
            field,
            value: scalar(raw),
            origin,
        });
    }
}

/// 覆盖值的类型推断：布尔、整数、浮点，其余按字符串处理
fn scalar(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(flag) = raw.parse::<bool>() {
        return Value::Bool(flag);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Value::from(n);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}
