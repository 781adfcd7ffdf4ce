//! 各模块的扁平配置对象。
//!
//! 每个配置结构体声明字段名、类型和默认值，从 JSON 装载时拒绝未知
//! 字段，并在任何转换开始之前完成 [`Validate::validate`] 校验：配置
//! 错误是装载期硬错误，不属于核心引擎的降级范畴。

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConvertError};
use crate::style::value::TextAlign;
use crate::style::StyleProperty;

/// 可校验的配置对象。
pub trait Validate {
    /// 校验字段取值。
    ///
    /// # Errors
    ///
    /// 字段值不在允许范围内时返回 [`ConfigError`]。
    fn validate(&self) -> Result<(), ConfigError>;
}

/// 从 JSON 值装载并校验一个配置对象。
///
/// # Errors
///
/// JSON 结构不匹配（含未知字段）时返回 [`ConvertError::JsonParse`]，
/// 校验失败时返回 [`ConvertError::Config`]。
pub fn from_json<T>(value: serde_json::Value, context: &str) -> Result<T, ConvertError>
where
    T: serde::de::DeserializeOwned + Validate,
{
    let config: T = serde_json::from_value(value)
        .map_err(|e| ConvertError::json_parse(e, context.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// ISD 序列生成选项。
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(deny_unknown_fields, default)]
pub struct IsdGenerationOptions {
    /// 是否按显著时间点并行扇出。两条路径产出完全相同的序列。
    pub multithreaded: bool,
}

impl Default for IsdGenerationOptions {
    fn default() -> Self {
        Self {
            multithreaded: true,
        }
    }
}

impl Validate for IsdGenerationOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

bitflags::bitflags! {
    /// 过滤器流水线的开关集合。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FilterFlags: u32 {
        /// 把所有区域的内容并入一个区域。
        const MERGE_REGIONS = 1 << 0;
        /// 把区域内的段落合并为一个段落，以换行分隔。
        const MERGE_PARAGRAPHS = 1 << 1;
        /// 删除目标格式不支持的样式属性。
        const STRIP_UNSUPPORTED = 1 << 2;
        /// 删除等于默认值的计算样式。
        const REMOVE_DEFAULTS = 1 << 3;
    }
}

impl Default for FilterFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// 过滤器流水线选项。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FilterPipelineOptions {
    /// 启用哪些过滤器。
    pub flags: FilterFlags,
    /// [`FilterFlags::STRIP_UNSUPPORTED`] 保留的属性集合。
    pub supported_properties: Vec<StyleProperty>,
}

impl Validate for FilterPipelineOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.flags.contains(FilterFlags::STRIP_UNSUPPORTED)
            && self.supported_properties.is_empty()
        {
            return Err(ConfigError::MissingField(
                "supported_properties".to_string(),
            ));
        }
        Ok(())
    }
}

/// 文本类写出器（SRT/WebVTT）的通用选项。
///
/// 写出器本身在本 crate 之外，这里只声明边界上约定的字段。
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(deny_unknown_fields, default)]
pub struct TextWriterOptions {
    /// 提示块的文本对齐。
    pub text_align: TextAlign,
    /// 提示块的行位置，取值 0–100（百分比）。
    pub line_position: Option<f64>,
    /// 是否给每个提示块编号。
    pub cue_id: bool,
}

impl Default for TextWriterOptions {
    fn default() -> Self {
        Self {
            text_align: TextAlign::Center,
            line_position: None,
            cue_id: true,
        }
    }
}

impl Validate for TextWriterOptions {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(position) = self.line_position
            && !(0.0..=100.0).contains(&position)
        {
            return Err(ConfigError::InvalidValue {
                field: "line_position".to_string(),
                value: position.to_string(),
                expected: "0 到 100 之间的百分比".to_string(),
            });
        }
        Ok(())
    }
}
