//! 读取器/写出器边界。
//!
//! 各格式的读取器和写出器在本 crate 之外实现，这里只声明它们与核心
//! 引擎之间的契约：读取器产出 [`ContentDocument`]，写出器消费
//! （可能经过过滤的）ISD 序列。

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

use crate::error::ConvertError;
use crate::isd::Isd;
use crate::model::ContentDocument;
use crate::time::TimeOffset;

/// 枚举：支持的时序文本格式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize, Deserialize, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum TimedTextFormat {
    /// `Timed Text Markup Language` 格式。
    #[default]
    Ttml,
    /// IMSC（TTML 的字幕应用子集）格式。
    Imsc,
    /// CEA-608 `Scenarist Closed Caption` 字节流。
    Scc,
    /// EBU STL 二进制块流。
    Stl,
    /// `SubRip` 编号提示块文本。
    Srt,
    /// `WebVTT` 提示块文本。
    Vtt,
}

impl TimedTextFormat {
    /// 将格式枚举转换为对应的文件扩展名字符串。
    #[must_use]
    pub const fn to_extension_str(self) -> &'static str {
        match self {
            Self::Ttml | Self::Imsc => "ttml",
            Self::Scc => "scc",
            Self::Stl => "stl",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    /// 从字符串（通常是文件扩展名或用户输入）解析格式枚举。
    /// 不区分大小写，并会移除输入中的空格和点。
    #[must_use]
    pub fn from_string(s: &str) -> Option<Self> {
        let normalized = s.to_uppercase().replace([' ', '.'], "");
        match normalized.as_str() {
            "TTML" | "XML" | "DFXP" => Some(Self::Ttml),
            "IMSC" => Some(Self::Imsc),
            "SCC" => Some(Self::Scc),
            "STL" => Some(Self::Stl),
            "SRT" | "SUBRIP" => Some(Self::Srt),
            "VTT" | "WEBVTT" => Some(Self::Vtt),
            _ => Self::from_str(s).ok(),
        }
    }

    /// 该格式的输入是否为文本（否则按字节流处理）。
    #[must_use]
    pub const fn is_textual(self) -> bool {
        !matches!(self, Self::Stl)
    }
}

impl fmt::Display for TimedTextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ttml => write!(f, "TTML"),
            Self::Imsc => write!(f, "IMSC"),
            Self::Scc => write!(f, "SCC"),
            Self::Stl => write!(f, "STL"),
            Self::Srt => write!(f, "SRT"),
            Self::Vtt => write!(f, "WebVTT"),
        }
    }
}

/// 传递给读取器的单个输入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSource {
    /// 原始字节内容。文本格式按 UTF-8 解释。
    pub bytes: Vec<u8>,
    /// 内容的格式。
    pub format: TimedTextFormat,
    /// 可选的原始文件名，用于日志和错误定位。
    pub filename: Option<String>,
}

impl InputSource {
    /// 创建一个输入。
    #[must_use]
    pub fn new(bytes: Vec<u8>, format: TimedTextFormat, filename: Option<String>) -> Self {
        Self {
            bytes,
            format,
            filename,
        }
    }
}

/// 进度回调：接收 [0, 1] 区间内的完成比例，尽力单调递增，不得阻塞。
pub type ProgressSink<'a> = Option<&'a (dyn Fn(f32) + Send + Sync)>;

/// 读取器契约：把一种输入语法装载为内容文档。
///
/// 实现必须填充文档初始值、单元格分辨率、带几何与样式的区域集合，
/// 以及带指定样式和时间属性的 body 树；空白归一化通过
/// [`ContentDocument::collapse_whitespace`] 在建树完成后执行一次。
pub trait DocumentReader {
    /// 读取器对应的格式。
    fn format(&self) -> TimedTextFormat;

    /// 解析输入并构建文档模型。
    ///
    /// # Errors
    ///
    /// 输入语法错误时返回 [`ConvertError::Malformed`]，并尽可能带上
    /// 位置提示。
    fn to_model(
        &self,
        source: &InputSource,
        progress: ProgressSink<'_>,
    ) -> Result<ContentDocument, ConvertError>;
}

/// 写出器契约：把 ISD 序列序列化为目标语法。
pub trait IsdWriter {
    /// 写出器对应的格式。
    fn format(&self) -> TimedTextFormat;

    /// 序列化一个按时间点升序排列的 ISD 序列。
    ///
    /// # Errors
    ///
    /// 序列无法在目标格式中表达时返回错误。
    fn write(&self, sequence: &[(TimeOffset, Isd)]) -> Result<Vec<u8>, ConvertError>;
}
