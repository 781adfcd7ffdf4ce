//! 样式与布局的不可变值类型。
//!
//! 这些类型只承载数值本身；继承性、初始值和适用元素等元数据统一放在
//! [`super::property`] 的属性表里。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::ConvertError;

/// RGBA 颜色，各分量 0–255。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// 红色分量。
    pub r: u8,
    /// 绿色分量。
    pub g: u8,
    /// 蓝色分量。
    pub b: u8,
    /// 不透明度分量。
    pub a: u8,
}

impl Rgba {
    /// 完全透明。
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// 不透明白色。
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// 不透明黑色。
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// 按分量创建颜色。
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl FromStr for Rgba {
    type Err = ConvertError;

    /// 解析 `#rrggbb` 或 `#rrggbbaa` 形式的颜色字符串。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').ok_or_else(|| {
            ConvertError::Malformed {
                location: String::new(),
                message: format!("颜色值缺少 '#' 前缀: {s}"),
            }
        })?;
        if !hex.is_ascii() {
            return Err(ConvertError::Malformed {
                location: String::new(),
                message: format!("无效的颜色分量: {s}"),
            });
        }
        let parse_pair = |i: usize| -> Result<u8, ConvertError> {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConvertError::Malformed {
                location: String::new(),
                message: format!("无效的颜色分量: {s}"),
            })
        };
        match hex.len() {
            6 => Ok(Self::new(parse_pair(0)?, parse_pair(2)?, parse_pair(4)?, 255)),
            8 => Ok(Self::new(
                parse_pair(0)?,
                parse_pair(2)?,
                parse_pair(4)?,
                parse_pair(6)?,
            )),
            _ => Err(ConvertError::Malformed {
                location: String::new(),
                message: format!("无效的颜色长度: {s}"),
            }),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

/// 长度单位。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
pub enum LengthUnit {
    /// 单元格（由文档的 cell resolution 决定实际大小）。
    #[strum(serialize = "c")]
    #[default]
    Cell,
    /// 相对当前字号。
    #[strum(serialize = "em")]
    Em,
    /// 相对所属上下文的百分比。
    #[strum(serialize = "%")]
    Percent,
    /// 像素。
    #[strum(serialize = "px")]
    Pixel,
}

/// 带单位的长度值。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    /// 数值部分。
    pub value: f64,
    /// 单位。
    pub unit: LengthUnit,
}

impl Length {
    /// 创建长度值。
    #[must_use]
    pub const fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    /// 以单元格为单位的长度。
    #[must_use]
    pub const fn cells(value: f64) -> Self {
        Self::new(value, LengthUnit::Cell)
    }

    /// 百分比长度。
    #[must_use]
    pub const fn percent(value: f64) -> Self {
        Self::new(value, LengthUnit::Percent)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

/// 区域尺寸（宽 × 高）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// 宽度。
    pub width: Length,
    /// 高度。
    pub height: Length,
}

/// 区域原点或内容位置（x, y）。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// 横向偏移。
    pub x: Length,
    /// 纵向偏移。
    pub y: Length,
}

/// 区域内边距，按书写方向的 before/end/after/start 四边。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    /// 行进方向前侧。
    pub before: Length,
    /// 行内方向末侧。
    pub end: Length,
    /// 行进方向后侧。
    pub after: Length,
    /// 行内方向起始侧。
    pub start: Length,
}

impl Padding {
    /// 四边相同的内边距。
    #[must_use]
    pub const fn uniform(length: Length) -> Self {
        Self {
            before: length,
            end: length,
            after: length,
            start: length,
        }
    }
}

/// 单元格网格分辨率，决定 [`LengthUnit::Cell`] 的实际大小。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellResolution {
    /// 行数。
    pub rows: u32,
    /// 列数。
    pub columns: u32,
}

impl Default for CellResolution {
    /// TTML 的默认网格为 32 列 × 15 行。
    fn default() -> Self {
        Self {
            rows: 15,
            columns: 32,
        }
    }
}

/// 行高。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineHeight {
    /// 由排版实现决定的正常行高。
    Normal,
    /// 显式长度。
    Length(Length),
}

/// 文本水平对齐方式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TextAlign {
    /// 行首对齐（随书写方向）。
    #[default]
    Start,
    /// 居中。
    Center,
    /// 行尾对齐（随书写方向）。
    End,
    /// 左对齐。
    Left,
    /// 右对齐。
    Right,
}

/// 区域内的块级对齐方式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayAlign {
    /// 靠区域前侧。
    #[default]
    Before,
    /// 居中。
    Center,
    /// 靠区域后侧。
    After,
}

/// 元素是否参与展示。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisplayMode {
    /// 自动（参与展示）。
    #[default]
    Auto,
    /// 不展示，且不占布局空间。
    None,
}

/// 可见性。与 [`DisplayMode`] 不同，隐藏元素仍占布局空间。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Visibility {
    /// 可见。
    #[default]
    Visible,
    /// 隐藏。
    Hidden,
}

/// 字体样式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FontStyle {
    /// 常规。
    #[default]
    Normal,
    /// 斜体。
    Italic,
    /// 倾斜。
    Oblique,
}

/// 字重。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FontWeight {
    /// 常规。
    #[default]
    Normal,
    /// 粗体。
    Bold,
}

/// 文本装饰线。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum TextDecoration {
    /// 无装饰。
    #[strum(serialize = "none")]
    #[default]
    None,
    /// 下划线。
    #[strum(serialize = "underline")]
    Underline,
    /// 删除线。
    #[strum(serialize = "lineThrough")]
    LineThrough,
    /// 上划线。
    #[strum(serialize = "overline")]
    Overline,
}

/// 书写方向（行内方向）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// 从左到右。
    #[default]
    Ltr,
    /// 从右到左。
    Rtl,
}

/// Unicode 双向文本控制。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum UnicodeBidi {
    /// 正常。
    #[strum(serialize = "normal")]
    #[default]
    Normal,
    /// 嵌入新的方向层级。
    #[strum(serialize = "embed")]
    Embed,
    /// 强制覆盖方向。
    #[strum(serialize = "bidiOverride")]
    BidiOverride,
}

/// 区域内容溢出处理。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Overflow {
    /// 裁剪溢出内容。
    #[default]
    Hidden,
    /// 允许溢出可见。
    Visible,
}

/// 区域背景何时绘制。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum ShowBackground {
    /// 区域激活期间始终绘制。
    #[strum(serialize = "always")]
    #[default]
    Always,
    /// 仅在区域内有活动内容时绘制。
    #[strum(serialize = "whenActive")]
    WhenActive,
}

/// 自动换行策略。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum WrapOption {
    /// 允许换行。
    #[strum(serialize = "wrap")]
    #[default]
    Wrap,
    /// 不换行。
    #[strum(serialize = "noWrap")]
    NoWrap,
}

/// 书写模式（块行进方向 + 行内方向）。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, Default,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WritingMode {
    /// 行内从左到右，块从上到下。
    #[default]
    Lrtb,
    /// 行内从右到左，块从上到下。
    Rltb,
    /// 竖排，列从左到右。
    Tblr,
    /// 竖排，列从右到左。
    Tbrl,
}

/// 一个样式属性的值。
///
/// 每个 [`super::property::StyleProperty`] 只对应这里的一个变体；属性表的
/// 初始值与级联计算出的值共用这一类型。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleValue {
    /// 颜色值。
    Color(Rgba),
    /// 长度值。
    Length(Length),
    /// 尺寸值。
    Extent(Extent),
    /// 位置值。
    Position(Position),
    /// 内边距。
    Padding(Padding),
    /// 字体族列表，按优先级排列。
    FontFamilies(Vec<String>),
    /// 行高。
    LineHeight(LineHeight),
    /// 不透明度，0.0–1.0。
    Opacity(f64),
    /// 文本对齐。
    TextAlign(TextAlign),
    /// 块对齐。
    DisplayAlign(DisplayAlign),
    /// 展示开关。
    Display(DisplayMode),
    /// 可见性。
    Visibility(Visibility),
    /// 字体样式。
    FontStyle(FontStyle),
    /// 字重。
    FontWeight(FontWeight),
    /// 文本装饰。
    TextDecoration(TextDecoration),
    /// 行内方向。
    Direction(Direction),
    /// 双向文本控制。
    UnicodeBidi(UnicodeBidi),
    /// 溢出处理。
    Overflow(Overflow),
    /// 背景绘制时机。
    ShowBackground(ShowBackground),
    /// 换行策略。
    WrapOption(WrapOption),
    /// 书写模式。
    WritingMode(WritingMode),
}
