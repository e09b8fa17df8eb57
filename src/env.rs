//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。每个变量都是一个实现了 [`EnvVar`] 的
//! 零大小类型，名称、默认值和说明都以常量形式给出，命令行的帮助输出直接读取它们。

use std::env;
use std::fmt;

use crate::core::UrlOptions;
use crate::parsers::JsScanMode;

/// 环境变量解析错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    /// 读取变量，无效值记录警告后使用 `default`
    fn get_or_default(default: T) -> T {
        match Self::get() {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("{}", error);
                default
            }
        }
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "CONTENT_URLS_LOG_LEVEL";
        const DEFAULT: Option<String> = None;

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("warn".to_string()),
            }
        }
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn parse(value: &str) -> EnvResult<String> {
            match value.trim().to_lowercase().as_str() {
                level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }

    /// 禁用颜色输出
    pub struct NoColor;
    impl EnvVar<bool> for NoColor {
        const NAME: &'static str = "NO_COLOR";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Disable colored output when set to any value";

        fn parse(value: &str) -> EnvResult<bool> {
            // NO_COLOR 遵循标准：任何值都表示禁用颜色
            Ok(!value.is_empty())
        }
    }
}

/// 解析相关环境变量
pub mod parsing {
    use super::*;

    /// JavaScript URL 扫描模式
    pub struct JsMode;
    impl EnvVar<JsScanMode> for JsMode {
        const NAME: &'static str = "CONTENT_URLS_JS_MODE";
        const DEFAULT: Option<JsScanMode> = Some(JsScanMode::Literals);
        const DESCRIPTION: &'static str =
            "JavaScript scan mode: literals (string literals only), plain (whole source, imprecise)";

        fn parse(value: &str) -> EnvResult<JsScanMode> {
            value.parse::<JsScanMode>().map_err(|message| EnvError {
                variable: Self::NAME.to_string(),
                message,
            })
        }
    }

    /// 是否使用文档中声明的 base URL
    pub struct UseBaseUrl;
    impl EnvVar<bool> for UseBaseUrl {
        const NAME: &'static str = "CONTENT_URLS_USE_BASE_URL";
        const DEFAULT: Option<bool> = Some(false);
        const DESCRIPTION: &'static str = "Resolve URLs against the base declared in the document";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

/// 辅助函数
fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

/// 环境变量配置汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub log_level: String,
    pub no_color: bool,
    pub js_mode: JsScanMode,
    pub use_base_url: bool,
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> EnvResult<Self> {
        Ok(Self {
            log_level: core::LogLevel::get()?,
            no_color: core::NoColor::get()?,
            js_mode: parsing::JsMode::get()?,
            use_base_url: parsing::UseBaseUrl::get()?,
        })
    }

    /// 由配置得到的提取选项（不含内容 URL）
    pub fn url_options(&self) -> UrlOptions {
        UrlOptions::new().with_base_url(self.use_base_url)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            log_level: "warn".to_string(),
            no_color: false,
            js_mode: JsScanMode::default(),
            use_base_url: false,
        }
    }
}

/// 所有环境变量的名称、说明与默认值
pub fn describe_all() -> Vec<(&'static str, &'static str, String)> {
    vec![
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "warn".to_string()),
        (core::NoColor::NAME, core::NoColor::DESCRIPTION, "unset".to_string()),
        (
            parsing::JsMode::NAME,
            parsing::JsMode::DESCRIPTION,
            JsScanMode::default().to_string(),
        ),
        (
            parsing::UseBaseUrl::NAME,
            parsing::UseBaseUrl::DESCRIPTION,
            "false".to_string(),
        ),
    ]
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::from("Environment variables:\n");

    for (name, description, default) in describe_all() {
        docs.push_str(&format!("  {:<28}{} (default: {})\n", name, description, default));
    }

    docs
}
