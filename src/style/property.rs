//! 样式属性及其权威元数据表。
//!
//! 每个属性带三项元数据：是否可继承、固有初始值、适用的元素类型。
//! 级联（[`crate::isd::cascade`]）和默认值过滤器都以这张表为准。

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::value::{
    DisplayAlign, DisplayMode, Extent, Length, LineHeight, Overflow, Padding, Position, Rgba,
    ShowBackground, StyleValue, TextAlign, TextDecoration, UnicodeBidi, Visibility, WrapOption,
    WritingMode,
};
use crate::style::value::{Direction, FontStyle, FontWeight};

bitflags::bitflags! {
    /// 元素类型集合，用于描述属性的适用范围。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ElementKinds: u8 {
        /// 区域。
        const REGION = 1 << 0;
        /// 文档主体。
        const BODY = 1 << 1;
        /// 块级分组。
        const DIV = 1 << 2;
        /// 段落。
        const P = 1 << 3;
        /// 行内片段。
        const SPAN = 1 << 4;
        /// 换行。
        const BR = 1 << 5;
        /// 文本叶子。文本自身不承载样式，样式取自包裹它的行内元素。
        const TEXT = 1 << 6;
    }
}

impl ElementKinds {
    /// 所有可以承载样式的内容元素。
    pub const STYLABLE: Self = Self::REGION
        .union(Self::BODY)
        .union(Self::DIV)
        .union(Self::P)
        .union(Self::SPAN)
        .union(Self::BR);

    /// 行内文本上下文（段落与行内片段）。
    pub const INLINE: Self = Self::P.union(Self::SPAN);
}

/// 样式属性。字符串形式与 TTML 的 `tts:*` 属性名一致。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum StyleProperty {
    /// 背景颜色。
    #[strum(serialize = "backgroundColor")]
    BackgroundColor,
    /// 前景（文字）颜色。
    #[strum(serialize = "color")]
    Color,
    /// 行内方向。
    #[strum(serialize = "direction")]
    Direction,
    /// 展示开关。
    #[strum(serialize = "display")]
    Display,
    /// 区域内块对齐。
    #[strum(serialize = "displayAlign")]
    DisplayAlign,
    /// 区域尺寸。
    #[strum(serialize = "extent")]
    Extent,
    /// 字体族。
    #[strum(serialize = "fontFamily")]
    FontFamily,
    /// 字号。
    #[strum(serialize = "fontSize")]
    FontSize,
    /// 字体样式。
    #[strum(serialize = "fontStyle")]
    FontStyle,
    /// 字重。
    #[strum(serialize = "fontWeight")]
    FontWeight,
    /// 行高。
    #[strum(serialize = "lineHeight")]
    LineHeight,
    /// 区域不透明度。
    #[strum(serialize = "opacity")]
    Opacity,
    /// 区域原点。
    #[strum(serialize = "origin")]
    Origin,
    /// 区域溢出处理。
    #[strum(serialize = "overflow")]
    Overflow,
    /// 区域内边距。
    #[strum(serialize = "padding")]
    Padding,
    /// 区域位置。
    #[strum(serialize = "position")]
    Position,
    /// 区域背景绘制时机。
    #[strum(serialize = "showBackground")]
    ShowBackground,
    /// 文本对齐。
    #[strum(serialize = "textAlign")]
    TextAlign,
    /// 文本装饰。
    #[strum(serialize = "textDecoration")]
    TextDecoration,
    /// 双向文本控制。
    #[strum(serialize = "unicodeBidi")]
    UnicodeBidi,
    /// 可见性。
    #[strum(serialize = "visibility")]
    Visibility,
    /// 换行策略。
    #[strum(serialize = "wrapOption")]
    WrapOption,
    /// 书写模式。
    #[strum(serialize = "writingMode")]
    WritingMode,
}

impl StyleProperty {
    /// 属性是否沿内容树继承。
    ///
    /// 不可继承的属性只能通过指定值、区域默认值、文档初始值或固有
    /// 初始值得到，永远不会取父元素的计算值。
    #[must_use]
    pub const fn is_inherited(self) -> bool {
        matches!(
            self,
            Self::Color
                | Self::Direction
                | Self::FontFamily
                | Self::FontSize
                | Self::FontStyle
                | Self::FontWeight
                | Self::LineHeight
                | Self::TextAlign
                | Self::TextDecoration
                | Self::Visibility
                | Self::WrapOption
        )
    }

    /// 属性是否允许区域级默认：级联第 3 步只对这类属性生效。
    ///
    /// 可继承属性的继承链在 body 根处没有父元素，靠这一标记经由级联
    /// 第 3 步落到区域上。目前集合与可继承集合一致；级联按这个标记
    /// 而不是 [`Self::is_inherited`] 判断，使两者将来可以独立演化。
    #[must_use]
    pub const fn allows_region_default(self) -> bool {
        self.is_inherited()
    }

    /// 属性适用的元素类型集合。
    #[must_use]
    pub const fn applies_to(self) -> ElementKinds {
        match self {
            Self::BackgroundColor => ElementKinds::STYLABLE,
            Self::Color
            | Self::Direction
            | Self::FontFamily
            | Self::FontSize
            | Self::FontStyle
            | Self::FontWeight
            | Self::TextDecoration
            | Self::UnicodeBidi
            | Self::WrapOption => ElementKinds::INLINE,
            Self::Display | Self::Visibility => ElementKinds::STYLABLE,
            Self::DisplayAlign
            | Self::Extent
            | Self::Opacity
            | Self::Origin
            | Self::Overflow
            | Self::Padding
            | Self::Position
            | Self::ShowBackground
            | Self::WritingMode => ElementKinds::REGION,
            Self::LineHeight | Self::TextAlign => ElementKinds::P,
        }
    }

    /// 属性的固有初始值，独立于任何文档。
    ///
    /// 文档可以用自己的初始值映射覆盖这里的取值（级联第 4 步先于第 5 步）。
    #[must_use]
    pub fn initial_value(self) -> StyleValue {
        match self {
            Self::BackgroundColor => StyleValue::Color(Rgba::TRANSPARENT),
            Self::Color => StyleValue::Color(Rgba::WHITE),
            Self::Direction => StyleValue::Direction(Direction::Ltr),
            Self::Display => StyleValue::Display(DisplayMode::Auto),
            Self::DisplayAlign => StyleValue::DisplayAlign(DisplayAlign::Before),
            Self::Extent => StyleValue::Extent(Extent {
                width: Length::percent(100.0),
                height: Length::percent(100.0),
            }),
            Self::FontFamily => StyleValue::FontFamilies(vec!["default".to_string()]),
            Self::FontSize => StyleValue::Length(Length::cells(1.0)),
            Self::FontStyle => StyleValue::FontStyle(FontStyle::Normal),
            Self::FontWeight => StyleValue::FontWeight(FontWeight::Normal),
            Self::LineHeight => StyleValue::LineHeight(LineHeight::Normal),
            Self::Opacity => StyleValue::Opacity(1.0),
            Self::Origin | Self::Position => StyleValue::Position(Position {
                x: Length::percent(0.0),
                y: Length::percent(0.0),
            }),
            Self::Overflow => StyleValue::Overflow(Overflow::Hidden),
            Self::Padding => StyleValue::Padding(Padding::uniform(Length::percent(0.0))),
            Self::ShowBackground => StyleValue::ShowBackground(ShowBackground::Always),
            Self::TextAlign => StyleValue::TextAlign(TextAlign::Start),
            Self::TextDecoration => StyleValue::TextDecoration(TextDecoration::None),
            Self::UnicodeBidi => StyleValue::UnicodeBidi(UnicodeBidi::Normal),
            Self::Visibility => StyleValue::Visibility(Visibility::Visible),
            Self::WrapOption => StyleValue::WrapOption(WrapOption::Wrap),
            Self::WritingMode => StyleValue::WritingMode(WritingMode::Lrtb),
        }
    }
}
