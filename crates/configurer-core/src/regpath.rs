//! 注册表路径模型：将完整路径字符串拆分为“根键 + 子路径”，以及值类型/值编码规则。
//!
//! 约定：
//! - 分隔符为反斜杠 `\`，连续或结尾的分隔符产生的空段会被忽略
//! - [`KeyPath`] 只做语法拆分，不校验根键；[`RegistryPath`] 在此基础上解析根键别名
//! - 根键别名、类型名均为大小写敏感的精确匹配
//!
//! 作者：Configurer 项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;

use crate::error::{ConfigurerError, Result};

/// 路径分隔符。
pub const SEPARATOR: char = '\\';

/// 注册表根键。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKey {
    /// HKEY_CURRENT_USER（HKCU）。
    CurrentUser,
    /// HKEY_LOCAL_MACHINE（HKLM）。
    LocalMachine,
    /// HKEY_USERS。
    Users,
}

/// 根键别名表：(别名, 根键)。
const ROOT_ALIASES: &[(&str, RootKey)] = &[
    ("HKEY_CURRENT_USER", RootKey::CurrentUser),
    ("HKCU", RootKey::CurrentUser),
    ("HKEY_LOCAL_MACHINE", RootKey::LocalMachine),
    ("HKLM", RootKey::LocalMachine),
    ("HKEY_USERS", RootKey::Users),
];

impl RootKey {
    /// 按别名解析根键。
    ///
    /// 参数：
    /// - `alias`：完整名称或缩写（如 `HKEY_LOCAL_MACHINE` / `HKLM`）
    ///
    /// 异常处理：
    /// - 别名不在别名表中时返回 [`ConfigurerError::UnknownRootKey`]
    pub fn from_alias(alias: &str) -> Result<Self> {
        ROOT_ALIASES
            .iter()
            .find(|(name, _)| *name == alias)
            .map(|(_, root)| *root)
            .ok_or_else(|| ConfigurerError::UnknownRootKey(alias.to_string()))
    }

    /// 规范名称（`reg.exe` 也接受该形式）。
    pub fn canonical_name(self) -> &'static str {
        match self {
            RootKey::CurrentUser => "HKEY_CURRENT_USER",
            RootKey::LocalMachine => "HKEY_LOCAL_MACHINE",
            RootKey::Users => "HKEY_USERS",
        }
    }
}

/// 语法层面的键路径（不校验根键是否合法）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// 按 `\` 拆分路径字符串。
    ///
    /// 异常处理：
    /// - 拆分后没有任何非空段时返回 [`ConfigurerError::MalformedPath`]
    pub fn split(raw: &str) -> Result<Self> {
        let segments: Vec<String> = raw
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if segments.is_empty() {
            return Err(ConfigurerError::MalformedPath(raw.to_string()));
        }
        Ok(Self { segments })
    }

    /// 全部路径段（至少一段）。
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 首段（根键别名原文）。
    pub fn base_key(&self) -> &str {
        &self.segments[0]
    }

    /// 末段名称。
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// 去掉首段后的子路径；仅有根键时为空字符串。
    pub fn relative_path(&self) -> String {
        self.segments[1..].join("\\")
    }

    /// 父路径；仅有根键时返回 `None`。
    pub fn parent(&self) -> Option<KeyPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(KeyPath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("\\"))
    }
}

/// 已解析根键的完整注册表路径（构造后不可变）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryPath {
    root: RootKey,
    key: KeyPath,
}

impl RegistryPath {
    /// 解析完整路径，例如 `HKEY_LOCAL_MACHINE\Software\Vendor\Key`。
    ///
    /// 返回值：
    /// - 成功：根键与子路径；允许只有根键的路径
    ///
    /// 异常处理：
    /// - 空路径：[`ConfigurerError::MalformedPath`]
    /// - 首段不是已知别名：[`ConfigurerError::UnknownRootKey`]
    pub fn parse(raw: &str) -> Result<Self> {
        let key = KeyPath::split(raw)?;
        let root = RootKey::from_alias(key.base_key())?;
        Ok(Self { root, key })
    }

    pub fn root(&self) -> RootKey {
        self.root
    }

    pub fn key_path(&self) -> &KeyPath {
        &self.key
    }

    pub fn relative_path(&self) -> String {
        self.key.relative_path()
    }

    /// 是否只有根键。
    pub fn is_root(&self) -> bool {
        self.key.segments().len() == 1
    }

    /// 返回子路径；调用方要求必须存在子路径时使用。
    ///
    /// 异常处理：
    /// - 仅有根键时返回 [`ConfigurerError::MalformedPath`]
    pub fn require_relative(&self) -> Result<String> {
        if self.is_root() {
            return Err(ConfigurerError::MalformedPath(self.to_string()));
        }
        Ok(self.relative_path())
    }

    /// 从最浅到最深列出根键以下的每一级路径（包含自身，不包含根键本身）。
    ///
    /// 示例：
    /// - `HKLM\A\B` -> `[HKLM\A, HKLM\A\B]`
    pub fn key_chain(&self) -> Vec<RegistryPath> {
        let segments = self.key.segments();
        (2..=segments.len())
            .map(|depth| RegistryPath {
                root: self.root,
                key: KeyPath {
                    segments: segments[..depth].to_vec(),
                },
            })
            .collect()
    }
}

impl fmt::Display for RegistryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.key.fmt(f)
    }
}

/// 注册表值类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// 字符串（REG_SZ）。
    Sz,
    /// 32 位无符号整数（REG_DWORD）。
    Dword,
}

impl ValueType {
    /// 解析类型名：`REG_SZ`、`REG_DWORD`（旧数据中也可能是 `DWORD`）。
    ///
    /// 异常处理：
    /// - 其他字符串返回 [`ConfigurerError::UndefinedValueType`]
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "REG_SZ" => Ok(ValueType::Sz),
            "REG_DWORD" | "DWORD" => Ok(ValueType::Dword),
            other => Err(ConfigurerError::UndefinedValueType(other.to_string())),
        }
    }

    /// `reg.exe /t` 参数使用的类型名。
    pub fn reg_name(self) -> &'static str {
        match self {
            ValueType::Sz => "REG_SZ",
            ValueType::Dword => "REG_DWORD",
        }
    }
}

/// 注册表值（按原生表示比较，DWORD 按数值比较）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryValue {
    Sz(String),
    Dword(u32),
}

impl RegistryValue {
    /// 将文本值按声明类型转换为原生表示。
    ///
    /// 规则：
    /// - `Sz`：原样保留
    /// - `Dword`：十进制 u32，允许首尾空白；其他输入一律拒绝
    ///
    /// 异常处理：
    /// - 无法转换时返回 [`ConfigurerError::InvalidValueEncoding`]
    pub fn from_text(value_type: ValueType, text: &str) -> Result<Self> {
        match value_type {
            ValueType::Sz => Ok(RegistryValue::Sz(text.to_string())),
            ValueType::Dword => text
                .trim()
                .parse::<u32>()
                .map(RegistryValue::Dword)
                .map_err(|_| ConfigurerError::InvalidValueEncoding {
                    value_type: value_type.reg_name().to_string(),
                    value: text.to_string(),
                }),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            RegistryValue::Sz(_) => ValueType::Sz,
            RegistryValue::Dword(_) => ValueType::Dword,
        }
    }

    /// `reg.exe /d` 参数使用的文本形式。
    pub fn to_reg_data(&self) -> String {
        match self {
            RegistryValue::Sz(s) => s.clone(),
            RegistryValue::Dword(v) => v.to_string(),
        }
    }
}

impl fmt::Display for RegistryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryValue::Sz(s) => f.write_str(s),
            RegistryValue::Dword(v) => write!(f, "{v}"),
        }
    }
}
