//! CSV 数据文件（`data/registry-values.csv`、`data/installer-args.csv`）。
//!
//! 格式：
//! - 首行为表头；列顺序不限，多余的列会被忽略
//! - `registry-values.csv`：`Path,Name,Type,Value`
//! - `installer-args.csv`：`Fichier,Args`
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::warn;

use crate::error::{ConfigurerError, Result};

/// 注册表值 CSV 文件名。
pub const REGISTRY_VALUES_FILE: &str = "registry-values.csv";

/// 安装参数 CSV 文件名。
pub const INSTALLER_ARGS_FILE: &str = "installer-args.csv";

/// `registry-values.csv` 的原始行（列可能缺失或为空）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistryValueRow {
    #[serde(rename = "Path", default)]
    pub path: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Type", default)]
    pub value_type: Option<String>,
    #[serde(rename = "Value", default)]
    pub value: Option<String>,
}

/// 校验后的注册表写入项（四个字段均存在）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValueSpec {
    pub path: String,
    pub name: String,
    pub value_type: String,
    pub value: String,
}

impl RegistryValueRow {
    /// 校验必填列。
    ///
    /// 异常处理：
    /// - 任一列缺失或为空字符串：[`ConfigurerError::MissingField`]，携带该行内容便于排障
    pub fn validate(&self) -> Result<RegistryValueSpec> {
        let field = |v: &Option<String>, name: &'static str| -> Result<String> {
            match v.as_deref() {
                Some(s) if !s.is_empty() => Ok(s.to_string()),
                _ => Err(ConfigurerError::MissingField {
                    field: name,
                    row: format!("{self:?}"),
                }),
            }
        };
        Ok(RegistryValueSpec {
            path: field(&self.path, "Path")?,
            name: field(&self.name, "Name")?,
            value_type: field(&self.value_type, "Type")?,
            value: field(&self.value, "Value")?,
        })
    }
}

/// `installer-args.csv` 的一行：文件名模式 + 附加参数。
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InstallerArgRule {
    /// 文件名 glob 模式（如 `Paratext*.exe`）。
    #[serde(rename = "Fichier", default)]
    pub pattern: String,
    /// 以空白分隔的参数列表。
    #[serde(rename = "Args", default)]
    pub args: String,
}

impl InstallerArgRule {
    /// 按空白拆分参数。
    pub fn split_args(&self) -> Vec<String> {
        self.args.split_whitespace().map(str::to_string).collect()
    }
}

/// 读取 `registry-values.csv`。
///
/// 返回值：
/// - 文件不存在：`Ok(None)`，由调用方提示
/// - 否则逐行返回解析结果；无法解码的行（如非 UTF-8 编码）为 `Err`，不影响其他行
///
/// 异常处理：
/// - 文件无法打开或表头无法读取时整体返回错误
pub fn load_registry_values(path: &Path) -> Result<Option<Vec<Result<RegistryValueRow>>>> {
    load_records(path)
}

/// 读取 `installer-args.csv`（文件顺序即匹配优先级）。
///
/// 说明：
/// - 无法解码的行记录警告后跳过
pub fn load_installer_args(path: &Path) -> Result<Option<Vec<InstallerArgRule>>> {
    let Some(records) = load_records(path)? else {
        return Ok(None);
    };
    let rules = records
        .into_iter()
        .filter_map(|record| match record {
            Ok(rule) => Some(rule),
            Err(e) => {
                warn!("ligne ignorée : {e}");
                None
            }
        })
        .collect();
    Ok(Some(rules))
}

/// 通用 CSV 读取：表头 + 按列名逐行反序列化。
///
/// 异常处理：
/// - 打开文件、读取表头或底层 IO 失败：整体返回 [`ConfigurerError::Csv`]
/// - 单行反序列化失败：该行为 `Err`，继续读取后续行
fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Option<Vec<Result<T>>>> {
    if !path.is_file() {
        return Ok(None);
    }
    let csv_err = |source| ConfigurerError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.byte_headers().map_err(csv_err)?.clone();
    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(csv_err)?;
        rows.push(record.deserialize(Some(&headers)).map_err(csv_err));
    }
    Ok(Some(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_or_missing_fields() {
        let row = RegistryValueRow {
            path: Some("HKLM\\Software\\Acme".into()),
            name: Some("Enabled".into()),
            value_type: Some("REG_DWORD".into()),
            value: Some(String::new()),
        };
        assert!(matches!(
            row.validate(),
            Err(ConfigurerError::MissingField { field: "Value", .. })
        ));

        let row = RegistryValueRow {
            name: None,
            value: Some("1".into()),
            ..row
        };
        assert!(matches!(
            row.validate(),
            Err(ConfigurerError::MissingField { field: "Name", .. })
        ));
    }

    #[test]
    fn split_args_on_whitespace() {
        let rule = InstallerArgRule {
            pattern: "*.msi".into(),
            args: "  /quiet   /norestart ".into(),
        };
        assert_eq!(rule.split_args(), vec!["/quiet", "/norestart"]);
        assert!(InstallerArgRule::default().split_args().is_empty());
    }
}
