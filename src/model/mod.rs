//! 内容文档模型。
//!
//! [`ContentDocument`] 用元素池统一持有所有元素的生命周期，树内只存
//! 句柄，读取器建好模型后，ISD 生成阶段对文档只读。

mod element;
mod whitespace;

use std::collections::{BTreeMap, HashMap, HashSet};

pub use element::{
    ContentElement, ElementId, ElementKind, SpecifiedStyle, StyleStep, TimeContainer, Timing,
};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConvertError;
use crate::style::value::CellResolution;
use crate::style::{StyleProperty, StyleValue};
use crate::time::TimeOffset;

/// 文档级命名样式：一组属性定义加上可选的 `extends` 链。
///
/// 链在构造时即保证无环，插入会形成环的样式是装载期错误。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedStyle {
    /// 样式标识符，文档内唯一。
    pub id: String,
    /// 属性定义。
    pub styles: HashMap<StyleProperty, StyleValue>,
    /// 被扩展的样式标识符。沿链查找时先到先得。
    pub extends: Option<String>,
}

impl NamedStyle {
    /// 创建一个空的命名样式。
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            styles: HashMap::new(),
            extends: None,
        }
    }
}

/// 内容文档：全部元素的所有者。
///
/// 持有区域映射（键唯一）、文档初始值映射、单元格网格分辨率和可选的
/// 单一 body 根。元素从树上摘除后成为独立子树，随文档一起释放。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentDocument {
    arena: Vec<ContentElement>,
    regions: BTreeMap<String, ElementId>,
    named_styles: HashMap<String, NamedStyle>,
    initial_values: HashMap<StyleProperty, StyleValue>,
    cell_resolution: CellResolution,
    body: Option<ElementId>,
    duration: Option<TimeOffset>,
}

impl ContentDocument {
    /// 创建空文档。
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 在元素池中创建一个游离元素，返回其句柄。
    pub fn create_element(&mut self, kind: ElementKind) -> ElementId {
        let id = ElementId(u32::try_from(self.arena.len()).unwrap_or(u32::MAX));
        self.arena.push(ContentElement::new(kind));
        id
    }

    /// 读取元素。句柄失效时返回 `None`。
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&ContentElement> {
        self.arena.get(id.0 as usize)
    }

    /// 可变读取元素。
    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut ContentElement> {
        self.arena.get_mut(id.0 as usize)
    }

    /// 元素池内的元素总数（含已摘除的游离子树）。
    #[must_use]
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// 文档是否没有任何元素。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// 把 `child` 追加为 `parent` 的最后一个子元素。
    ///
    /// `child` 必须是游离的（无父且不是 body 根）；区域元素不参与
    /// body 的包含链，不能作为子元素挂载。
    ///
    /// # Errors
    ///
    /// 句柄失效、`child` 已有父节点、挂载会形成环或 `child` 是区域时
    /// 返回 [`ConvertError::Internal`]。
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), ConvertError> {
        if parent == child {
            return Err(ConvertError::Internal("元素不能挂载到自身".to_string()));
        }
        let child_el = self
            .get(child)
            .ok_or_else(|| ConvertError::Internal("无效的子元素句柄".to_string()))?;
        if child_el.parent.is_some() {
            return Err(ConvertError::Internal(
                "子元素已有父节点，需先摘除".to_string(),
            ));
        }
        if matches!(child_el.kind, ElementKind::Region { .. }) {
            return Err(ConvertError::Internal(
                "区域元素不能挂载到内容树".to_string(),
            ));
        }
        if self.get(parent).is_none() {
            return Err(ConvertError::Internal("无效的父元素句柄".to_string()));
        }
        // 沿父链检查，防止把祖先挂到后代下面
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(ConvertError::Internal("挂载会形成环".to_string()));
            }
            cursor = self.get(id).and_then(ContentElement::parent);
        }
        self.arena[parent.0 as usize].children.push(child);
        self.arena[child.0 as usize].parent = Some(parent);
        Ok(())
    }

    /// 把元素从其父节点上摘除，使其成为独立的游离子树。
    ///
    /// 对游离元素调用是无害的空操作。
    pub fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.get(id).and_then(ContentElement::parent) else {
            return;
        };
        self.arena[parent.0 as usize].children.retain(|c| *c != id);
        self.arena[id.0 as usize].parent = None;
    }

    /// 设置 body 根。元素必须是游离的 [`ElementKind::Body`]。
    ///
    /// # Errors
    ///
    /// 句柄失效或元素不是 body 时返回 [`ConvertError::Internal`]。
    pub fn set_body(&mut self, id: ElementId) -> Result<(), ConvertError> {
        match self.get(id) {
            Some(el) if matches!(el.kind, ElementKind::Body) => {
                self.body = Some(id);
                Ok(())
            }
            Some(el) => Err(ConvertError::Internal(format!(
                "body 根必须是 body 元素，实际为 {}",
                el.kind.name()
            ))),
            None => Err(ConvertError::Internal("无效的元素句柄".to_string())),
        }
    }

    /// body 根句柄。
    #[must_use]
    pub const fn body(&self) -> Option<ElementId> {
        self.body
    }

    /// 把一个区域元素登记进区域映射。
    ///
    /// # Errors
    ///
    /// 元素不是区域时返回 [`ConvertError::Internal`]；区域标识符已被
    /// 占用时返回 [`ConvertError::DuplicateRegion`]。
    pub fn put_region(&mut self, id: ElementId) -> Result<(), ConvertError> {
        let Some(ElementKind::Region { id: region_id }) = self.get(id).map(ContentElement::kind)
        else {
            return Err(ConvertError::Internal(
                "只有区域元素可以登记进区域映射".to_string(),
            ));
        };
        let region_id = region_id.clone();
        if self.regions.contains_key(&region_id) {
            return Err(ConvertError::DuplicateRegion(region_id));
        }
        self.regions.insert(region_id, id);
        Ok(())
    }

    /// 按标识符查找区域。
    #[must_use]
    pub fn region(&self, region_id: &str) -> Option<ElementId> {
        self.regions.get(region_id).copied()
    }

    /// 按标识符升序迭代全部区域。
    pub fn regions(&self) -> impl Iterator<Item = (&str, ElementId)> {
        self.regions.iter().map(|(id, el)| (id.as_str(), *el))
    }

    /// 注册一个命名样式。
    ///
    /// # Errors
    ///
    /// 插入后 `extends` 链存在环时返回 [`ConvertError::CyclicStyleChain`]，
    /// 且该样式不会被注册。
    pub fn put_named_style(&mut self, style: NamedStyle) -> Result<(), ConvertError> {
        // 先沿既有链走一遍，确认新样式不会把链连成环
        let mut visited = HashSet::new();
        visited.insert(style.id.clone());
        let mut cursor = style.extends.clone();
        while let Some(next) = cursor {
            if !visited.insert(next.clone()) {
                return Err(ConvertError::CyclicStyleChain(style.id));
            }
            cursor = self
                .named_styles
                .get(&next)
                .and_then(|s| s.extends.clone());
        }
        // 每个样式只有一条出边，新增的环必然经过本样式，上面的链走查足以发现
        self.named_styles.insert(style.id.clone(), style);
        Ok(())
    }

    /// 按标识符查找命名样式。
    #[must_use]
    pub fn named_style(&self, style_id: &str) -> Option<&NamedStyle> {
        self.named_styles.get(style_id)
    }

    /// 沿命名样式的 `extends` 链解析某属性的定义，先到先得。
    #[must_use]
    pub fn resolve_named_style(
        &self,
        style_id: &str,
        property: StyleProperty,
    ) -> Option<&StyleValue> {
        let mut visited = HashSet::new();
        let mut cursor = Some(style_id);
        while let Some(id) = cursor {
            if !visited.insert(id.to_string()) {
                // 构造期已拒绝环，这里兜底以防外部直接反序列化出坏文档
                warn!("命名样式链中出现环: {id}");
                return None;
            }
            let style = self.named_styles.get(id)?;
            if let Some(value) = style.styles.get(&property) {
                return Some(value);
            }
            cursor = style.extends.as_deref();
        }
        None
    }

    /// 设置文档级初始值（级联第 4 步）。
    pub fn set_initial_value(&mut self, property: StyleProperty, value: StyleValue) {
        self.initial_values.insert(property, value);
    }

    /// 读取文档级初始值。
    #[must_use]
    pub fn initial_value(&self, property: StyleProperty) -> Option<&StyleValue> {
        self.initial_values.get(&property)
    }

    /// 单元格网格分辨率。
    #[must_use]
    pub const fn cell_resolution(&self) -> CellResolution {
        self.cell_resolution
    }

    /// 设置单元格网格分辨率。
    pub fn set_cell_resolution(&mut self, resolution: CellResolution) {
        self.cell_resolution = resolution;
    }

    /// 显式文档时长。缺省时根时间轴上的开放区间保持无界。
    #[must_use]
    pub const fn duration(&self) -> Option<TimeOffset> {
        self.duration
    }

    /// 设置显式文档时长。
    pub fn set_duration(&mut self, duration: Option<TimeOffset>) {
        self.duration = duration;
    }

    /// 文档是否含有任何内容（body 或区域）。
    #[must_use]
    pub fn has_content(&self) -> bool {
        self.body.is_some() || !self.regions.is_empty()
    }

    /// 对整个文档执行一次线性空白归一化。
    ///
    /// 这是模型构建期的一次性操作，由读取器在建树完成后调用；ISD
    /// 生成阶段不再处理空白。规则见 [`ContentDocument::collapse_whitespace`]
    /// 的实现模块。
    pub fn collapse_whitespace(&mut self) {
        whitespace::collapse_document(self);
    }

    /// 深度优先遍历一个子树，按文档顺序产出句柄（含起点自身）。
    pub(crate) fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(el) = self.get(id) {
                for child in el.children.iter().rev() {
                    stack.push(*child);
                }
            }
        }
        out
    }
}
