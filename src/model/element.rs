//! 内容树的元素类型。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::style::property::ElementKinds;
use crate::style::{StyleProperty, StyleValue};
use crate::time::TimeOffset;

/// 元素句柄：指向所属 [`super::ContentDocument`] 元素池的稳定索引。
///
/// 父引用和文档回引都用句柄表示，不持有所有权，因此树里不会出现
/// 引用计数循环；摘除节点只是断开句柄链接，O(1) 完成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub(crate) u32);

/// 元素变体。
///
/// 这是一个封闭的标签联合：结构性操作（子节点、样式、时间属性）由
/// [`ContentElement`] 统一承载，变体特有的数据（区域标识、文本负载）
/// 留在变体内部。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElementKind {
    /// 区域。不挂在 body 的包含链上，由段落等内容通过标识符引用。
    Region {
        /// 在文档内唯一的区域标识符。
        id: String,
    },
    /// 文档主体，单一根。
    Body,
    /// 块级分组。
    Div,
    /// 段落。
    P,
    /// 行内片段。
    Span,
    /// 换行。
    Br,
    /// 文本叶子，原样保存字符内容。
    Text {
        /// 文本负载。
        text: String,
    },
}

impl ElementKind {
    /// 变体名称，用于日志输出。
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Region { .. } => "region",
            Self::Body => "body",
            Self::Div => "div",
            Self::P => "p",
            Self::Span => "span",
            Self::Br => "br",
            Self::Text { .. } => "text",
        }
    }

    /// 对应的适用性掩码位。
    #[must_use]
    pub const fn mask(&self) -> ElementKinds {
        match self {
            Self::Region { .. } => ElementKinds::REGION,
            Self::Body => ElementKinds::BODY,
            Self::Div => ElementKinds::DIV,
            Self::P => ElementKinds::P,
            Self::Span => ElementKinds::SPAN,
            Self::Br => ElementKinds::BR,
            Self::Text { .. } => ElementKinds::TEXT,
        }
    }

    /// 是否是可直接呈现的叶子（文本或换行）。
    #[must_use]
    pub const fn is_presentable_leaf(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::Br)
    }
}

/// 时间容器语义：子元素的本地时间如何映射到父坐标系。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeContainer {
    /// 并行容器：所有子元素相对容器自身的起点。
    #[default]
    Par,
    /// 顺序容器：子元素首尾相接，后一个的本地零点是前一个的终点。
    Seq,
}

/// 元素的本地时间属性，均相对所属时间容器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Timing {
    /// 本地起点。缺省为容器起点。
    pub begin: Option<TimeOffset>,
    /// 本地终点。缺省时若给出 `dur` 则为 `begin + dur`，否则延伸到容器终点。
    pub end: Option<TimeOffset>,
    /// 持续时长，仅在未显式给出 `end` 时生效。
    pub dur: Option<TimeOffset>,
    /// 本元素作为容器时对子元素采用的语义。
    pub container: TimeContainer,
}

/// 元素上的一条指定样式：字面值，或对命名样式的引用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpecifiedStyle {
    /// 字面值。
    Literal(StyleValue),
    /// 引用命名样式中该属性的定义。
    Reference(String),
}

/// 一条样式动画步：在元素激活区间内的某个子区间里覆盖一个属性。
///
/// `begin`/`end` 相对元素自身的激活区间起点；都缺省时覆盖整个激活区间。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleStep {
    /// 目标属性。
    pub property: StyleProperty,
    /// 覆盖值。
    pub value: StyleValue,
    /// 相对元素区间起点的开始偏移。
    pub begin: Option<TimeOffset>,
    /// 相对元素区间起点的结束偏移。
    pub end: Option<TimeOffset>,
}

/// 内容树节点。
///
/// 不变式：`parent` 指针与父节点的 `children` 序列始终互相一致；
/// 由 [`super::ContentDocument`] 的树操作维护，外部不能直接改动链接。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentElement {
    pub(crate) kind: ElementKind,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    pub(crate) styles: HashMap<StyleProperty, SpecifiedStyle>,
    pub(crate) style_ref: Option<String>,
    pub(crate) region_ref: Option<String>,
    pub(crate) timing: Timing,
    pub(crate) animations: Vec<StyleStep>,
    pub(crate) space_preserve: bool,
}

impl ContentElement {
    pub(crate) fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            styles: HashMap::new(),
            style_ref: None,
            region_ref: None,
            timing: Timing::default(),
            animations: Vec::new(),
            space_preserve: false,
        }
    }

    /// 元素变体。
    #[must_use]
    pub const fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// 父元素句柄，根（或已摘除的）节点为 `None`。
    #[must_use]
    pub const fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// 有序子元素句柄。文本与换行叶子恒为空。
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// 本地时间属性。
    #[must_use]
    pub const fn timing(&self) -> &Timing {
        &self.timing
    }

    /// 设置本地时间属性。
    pub fn set_timing(&mut self, timing: Timing) {
        self.timing = timing;
    }

    /// 读取该元素上对某属性的指定值。
    #[must_use]
    pub fn specified_style(&self, property: StyleProperty) -> Option<&SpecifiedStyle> {
        self.styles.get(&property)
    }

    /// 在元素上直接指定一个字面样式值。同一属性后写的覆盖先写的。
    pub fn set_style(&mut self, property: StyleProperty, value: StyleValue) {
        self.styles.insert(property, SpecifiedStyle::Literal(value));
    }

    /// 让某属性引用一个命名样式中的定义。
    pub fn set_style_reference(&mut self, property: StyleProperty, style_id: impl Into<String>) {
        self.styles
            .insert(property, SpecifiedStyle::Reference(style_id.into()));
    }

    /// 该元素整体引用的命名样式。
    #[must_use]
    pub fn style_ref(&self) -> Option<&str> {
        self.style_ref.as_deref()
    }

    /// 设置元素整体引用的命名样式。
    pub fn set_style_ref(&mut self, style_id: impl Into<String>) {
        self.style_ref = Some(style_id.into());
    }

    /// 内容元素通过 `region` 属性引用的区域标识符。
    #[must_use]
    pub fn region_ref(&self) -> Option<&str> {
        self.region_ref.as_deref()
    }

    /// 指定该元素呈现在哪个区域。
    pub fn set_region_ref(&mut self, region_id: impl Into<String>) {
        self.region_ref = Some(region_id.into());
    }

    /// 该元素上的样式动画步，按文档顺序排列。
    #[must_use]
    pub fn animations(&self) -> &[StyleStep] {
        &self.animations
    }

    /// 追加一条样式动画步。
    pub fn push_animation(&mut self, step: StyleStep) {
        self.animations.push(step);
    }

    /// 是否要求保留空白（对应 `xml:space="preserve"`）。
    #[must_use]
    pub const fn space_preserve(&self) -> bool {
        self.space_preserve
    }

    /// 设置空白保留标记。该标记沿子树生效。
    pub fn set_space_preserve(&mut self, preserve: bool) {
        self.space_preserve = preserve;
    }

    /// 文本叶子的字符内容。
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { text } => Some(text),
            _ => None,
        }
    }
}
