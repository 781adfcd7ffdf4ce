//! 中间同步文档（ISD）。
//!
//! ISD 是文档在某一瞬间的完全解析快照：一组扁平的区域，每个区域持有
//! 一棵裁剪后的内容子树，节点上只携带级联完成的计算值。ISD 节点不再
//! 回到原始 [`crate::model::ContentDocument`] 做任何解析（`source`
//! 句柄只用于溯源和调试）。

pub(crate) mod builder;
pub(crate) mod cascade;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ElementId;
use crate::style::property::ElementKinds;
use crate::style::{StyleProperty, StyleValue};
use crate::time::TimeOffset;

/// ISD 节点的变体。区域在 [`IsdRegion`] 层表示，文本负载在 `text` 字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IsdElementKind {
    /// 文档主体。
    Body,
    /// 块级分组。
    Div,
    /// 段落。
    P,
    /// 行内片段。
    Span,
    /// 换行。
    Br,
    /// 文本叶子。
    Text,
}

impl IsdElementKind {
    /// 对应的属性适用性掩码位。
    #[must_use]
    pub const fn mask(self) -> ElementKinds {
        match self {
            Self::Body => ElementKinds::BODY,
            Self::Div => ElementKinds::DIV,
            Self::P => ElementKinds::P,
            Self::Span => ElementKinds::SPAN,
            Self::Br => ElementKinds::BR,
            Self::Text => ElementKinds::TEXT,
        }
    }
}

/// ISD 内容树节点：结构形状从模型复制，样式全部为计算值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsdElement {
    pub(crate) kind: IsdElementKind,
    pub(crate) text: Option<String>,
    pub(crate) styles: BTreeMap<StyleProperty, StyleValue>,
    pub(crate) children: Vec<IsdElement>,
    pub(crate) source: Option<ElementId>,
}

impl IsdElement {
    /// 节点变体。
    #[must_use]
    pub const fn kind(&self) -> IsdElementKind {
        self.kind
    }

    /// 文本叶子的字符内容。
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// 节点上的全部计算样式值。
    #[must_use]
    pub const fn styles(&self) -> &BTreeMap<StyleProperty, StyleValue> {
        &self.styles
    }

    /// 读取某属性的计算值。ISD 节点上不存在的属性不适用于该节点。
    #[must_use]
    pub fn style(&self, property: StyleProperty) -> Option<&StyleValue> {
        self.styles.get(&property)
    }

    /// 有序子节点。
    #[must_use]
    pub fn children(&self) -> &[IsdElement] {
        &self.children
    }

    /// 溯源：该节点复制自模型中的哪个元素。仅用于调试。
    #[must_use]
    pub const fn source(&self) -> Option<ElementId> {
        self.source
    }

    /// 按文档顺序拼接子树内的全部文本，换行以 `\n` 表示。
    #[must_use]
    pub fn collect_text(&self) -> String {
        let mut out = String::new();
        self.collect_text_into(&mut out);
        out
    }

    fn collect_text_into(&self, out: &mut String) {
        match self.kind {
            IsdElementKind::Text => {
                if let Some(text) = &self.text {
                    out.push_str(text);
                }
            }
            IsdElementKind::Br => out.push('\n'),
            _ => {
                for child in &self.children {
                    child.collect_text_into(out);
                }
            }
        }
    }
}

/// ISD 区域：区域自身的计算样式加上指派给它的内容。
///
/// 暂时没有内容的活动区域也会出现在 ISD 中，`contents` 为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsdRegion {
    pub(crate) id: String,
    pub(crate) styles: BTreeMap<StyleProperty, StyleValue>,
    pub(crate) contents: Vec<IsdElement>,
}

impl IsdRegion {
    /// 区域标识符。
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 区域自身的计算样式。
    #[must_use]
    pub const fn styles(&self) -> &BTreeMap<StyleProperty, StyleValue> {
        &self.styles
    }

    /// 读取区域上某属性的计算值。
    #[must_use]
    pub fn style(&self, property: StyleProperty) -> Option<&StyleValue> {
        self.styles.get(&property)
    }

    /// 指派给该区域的内容（通常是一个裁剪后的 body 子树）。
    #[must_use]
    pub fn contents(&self) -> &[IsdElement] {
        &self.contents
    }

    /// 区域在该瞬间是否没有任何内容。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// 一个瞬间的中间同步文档。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Isd {
    pub(crate) offset: TimeOffset,
    pub(crate) regions: BTreeMap<String, IsdRegion>,
}

impl Isd {
    /// 该快照对应的文档时间点。
    #[must_use]
    pub const fn offset(&self) -> TimeOffset {
        self.offset
    }

    /// 按区域标识符升序迭代区域。
    pub fn regions(&self) -> impl Iterator<Item = &IsdRegion> {
        self.regions.values()
    }

    /// 按标识符查找区域。
    #[must_use]
    pub fn region(&self, region_id: &str) -> Option<&IsdRegion> {
        self.regions.get(region_id)
    }

    /// 该瞬间活动区域的数量。
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// 是否没有任何活动区域。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
