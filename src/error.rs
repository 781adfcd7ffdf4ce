//! 定义文档建模与 ISD 解析过程中可能发生的各种错误。

use std::io;

use thiserror::Error;

/// 转换与解析流程的统一错误类型。
///
/// 逐元素的时间/样式异常不会产生错误：按照降级策略，异常元素被视为
/// 永不激活或回退到默认值，并通过 `tracing` 记录。只有无法给出合理
/// 默认行为的问题（样式链循环、配置错误、输入语法错误）才会上报。
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 输入格式错误，由各格式读取器在解析时抛出，并尽可能带上位置提示。
    #[error("输入格式错误 ({location}): {message}")]
    Malformed {
        /// 出错位置（行号、字节偏移等，由读取器决定粒度）。
        location: String,
        /// 错误描述。
        message: String,
    },
    /// 无效的时间表达式。
    #[error("无效的时间格式: {0}")]
    InvalidTime(String),
    /// 命名样式的 `extends` 链中存在循环引用。循环无法回退到合理默认值，
    /// 必须在装载时中止。
    #[error("样式链中存在循环引用: {0}")]
    CyclicStyleChain(String),
    /// 区域标识符在文档内重复。
    #[error("区域标识符重复: {0}")]
    DuplicateRegion(String),
    /// 配置错误，在任何转换开始之前抛出。
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// JSON 配置解析错误。
    #[error("解析 JSON 内容 {context} 失败: {source}")]
    JsonParse {
        /// 底层 `serde_json` 错误。
        #[source]
        source: serde_json::Error,
        /// 有关错误发生位置的上下文信息。
        context: String,
    },
    /// 文件读写等 IO 错误。
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 内部逻辑错误或未明确分类的错误。
    #[error("错误: {0}")]
    Internal(String),
}

impl ConvertError {
    /// 创建一个带有上下文的 `JsonParse` 错误。
    #[must_use]
    pub fn json_parse(source: serde_json::Error, context: String) -> Self {
        Self::JsonParse { source, context }
    }
}

impl From<ConvertError> for io::Error {
    fn from(err: ConvertError) -> Self {
        io::Error::other(err)
    }
}

/// 模块配置对象的校验错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 缺少必填字段。
    #[error("缺少必填配置字段: {0}")]
    MissingField(String),
    /// 字段值不在允许的范围或枚举集合内。
    #[error("配置字段 {field} 的值 {value} 无效，应为 {expected}")]
    InvalidValue {
        /// 字段名。
        field: String,
        /// 实际给出的值。
        value: String,
        /// 允许的取值描述。
        expected: String,
    },
    /// 出现了未声明的字段。
    #[error("未知的配置字段: {0}")]
    UnknownField(String),
}
