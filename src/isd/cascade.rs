//! 样式级联：计算某元素在某瞬间的属性值。
//!
//! 每个属性按固定顺序回退，命中即止：
//!
//! 1. 元素上的指定值（字面值，或沿命名样式的 `extends` 链解析）；
//! 2. 可继承属性取父元素的计算值；
//! 3. 允许区域级默认的属性取区域的计算值——可继承属性的继承链在
//!    body 根处没有父元素，正是经由这一步落到区域上，区域因此充当
//!    顶层内容的继承根；
//! 4. 文档初始值映射；
//! 5. 属性的固有初始值。
//!
//! 激活中的样式动画步（`set`）叠加在以上所有步骤之上。
//!
//! 解析器的记忆缓存以 `(元素, 属性)` 为键，生命周期只覆盖单次 ISD
//! 构建中的一个区域上下文：同一元素在不同区域里的继承来源不同，计算
//! 值可能不同，跨构建复用则会在文档被过滤器修改后泄漏陈旧值。

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::warn;

use crate::model::{ContentDocument, ElementId, SpecifiedStyle};
use crate::style::{StyleProperty, StyleValue};
use crate::time::TimeOffset;
use crate::timing::ResolvedTiming;

/// 单区域、单瞬间的级联求值器。
pub(crate) struct StyleResolver<'a> {
    doc: &'a ContentDocument,
    timing: &'a ResolvedTiming,
    offset: TimeOffset,
    region: ElementId,
    cache: RefCell<HashMap<(ElementId, StyleProperty), Option<StyleValue>>>,
}

impl<'a> StyleResolver<'a> {
    pub(crate) fn new(
        doc: &'a ContentDocument,
        timing: &'a ResolvedTiming,
        offset: TimeOffset,
        region: ElementId,
    ) -> Self {
        Self {
            doc,
            timing,
            offset,
            region,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// 计算元素某属性在本瞬间的值。
    ///
    /// 对存在于文档中的元素总能得到一个值（第 5 步兜底）；句柄失效时
    /// 返回 `None` 并记录告警。适用性过滤由调用方负责。
    pub(crate) fn computed(&self, id: ElementId, property: StyleProperty) -> Option<StyleValue> {
        let key = (id, property);
        if let Some(cached) = self.cache.borrow().get(&key) {
            return cached.clone();
        }
        let value = self.compute_uncached(id, property);
        self.cache.borrow_mut().insert(key, value.clone());
        value
    }

    fn compute_uncached(&self, id: ElementId, property: StyleProperty) -> Option<StyleValue> {
        let Some(el) = self.doc.get(id) else {
            warn!("级联遇到失效的元素句柄，按不适用处理");
            return None;
        };

        // 激活中的动画步压过一切静态来源
        if let Some(animated) = self.active_animation(id, property) {
            return Some(animated);
        }

        // 第 1 步：指定值
        if let Some(specified) = el.specified_style(property) {
            match specified {
                SpecifiedStyle::Literal(value) => return Some(value.clone()),
                SpecifiedStyle::Reference(style_id) => {
                    if let Some(value) = self.doc.resolve_named_style(style_id, property) {
                        return Some(value.clone());
                    }
                    warn!(
                        "属性 {property} 引用的命名样式 {style_id} 没有给出定义，继续回退"
                    );
                }
            }
        }
        if let Some(style_id) = el.style_ref()
            && let Some(value) = self.doc.resolve_named_style(style_id, property)
        {
            return Some(value.clone());
        }

        // 第 2 步：可继承属性取父元素的计算值
        if property.is_inherited()
            && let Some(parent) = el.parent()
            && let Some(value) = self.computed(parent, property)
        {
            return Some(value);
        }

        // 第 3 步：区域级默认值。body 根没有父元素，可继承属性的
        // 继承链在这里落到区域上
        if property.allows_region_default()
            && id != self.region
            && let Some(value) = self.computed(self.region, property)
        {
            return Some(value);
        }

        // 第 4 步：文档初始值
        if let Some(value) = self.doc.initial_value(property) {
            return Some(value.clone());
        }

        // 第 5 步：固有初始值
        Some(property.initial_value())
    }

    /// 在本瞬间激活、且目标为该属性的动画步里挑出生效的一条：
    /// 起点最晚者优先，起点相同时按文档顺序后写的覆盖先写的。
    fn active_animation(&self, id: ElementId, property: StyleProperty) -> Option<StyleValue> {
        let el = self.doc.get(id)?;
        if el.animations().is_empty() {
            return None;
        }
        let interval = self.timing.interval(id)?;
        el.animations()
            .iter()
            .filter(|step| step.property == property)
            .filter_map(|step| {
                let begin = interval.begin + step.begin.unwrap_or(TimeOffset::ZERO);
                let end = step.end.map(|e| interval.begin + e).or(interval.end);
                let active = self.offset >= begin
                    && interval.contains(begin)
                    && end.is_none_or(|e| self.offset < e);
                active.then_some((begin, &step.value))
            })
            .max_by_key(|(begin, _)| *begin)
            .map(|(_, value)| value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, NamedStyle, StyleStep, Timing};
    use crate::style::value::{FontWeight, Rgba};

    struct Fixture {
        doc: ContentDocument,
        region: ElementId,
        body: ElementId,
        p: ElementId,
        span: ElementId,
    }

    fn fixture() -> Fixture {
        let mut doc = ContentDocument::new();
        let region = doc.create_element(ElementKind::Region {
            id: "r1".to_string(),
        });
        doc.put_region(region).unwrap();
        let body = doc.create_element(ElementKind::Body);
        doc.set_body(body).unwrap();
        let p = doc.create_element(ElementKind::P);
        doc.get_mut(p).unwrap().set_region_ref("r1");
        doc.append_child(body, p).unwrap();
        let span = doc.create_element(ElementKind::Span);
        doc.append_child(p, span).unwrap();
        Fixture {
            doc,
            region,
            body,
            p,
            span,
        }
    }

    fn resolver_at<'a>(
        doc: &'a ContentDocument,
        timing: &'a ResolvedTiming,
        region: ElementId,
        offset: i64,
    ) -> StyleResolver<'a> {
        StyleResolver::new(doc, timing, TimeOffset::from_seconds(offset), region)
    }

    #[test]
    fn test_specified_value_wins() {
        let mut f = fixture();
        f.doc
            .get_mut(f.span)
            .unwrap()
            .set_style(StyleProperty::Color, StyleValue::Color(Rgba::BLACK));
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        assert_eq!(
            resolver.computed(f.span, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::BLACK))
        );
    }

    #[test]
    fn test_inherited_property_takes_parent_computed_value() {
        let mut f = fixture();
        f.doc
            .get_mut(f.p)
            .unwrap()
            .set_style(StyleProperty::Color, StyleValue::Color(Rgba::BLACK));
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        assert_eq!(
            resolver.computed(f.span, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::BLACK))
        );
    }

    #[test]
    fn test_non_inherited_property_skips_parent() {
        let mut f = fixture();
        f.doc.get_mut(f.p).unwrap().set_style(
            StyleProperty::BackgroundColor,
            StyleValue::Color(Rgba::BLACK),
        );
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        // span 不取父元素的背景色，落到固有初始值（透明）
        assert_eq!(
            resolver.computed(f.span, StyleProperty::BackgroundColor),
            Some(StyleValue::Color(Rgba::TRANSPARENT))
        );
    }

    #[test]
    fn test_region_is_inheritance_root() {
        let mut f = fixture();
        f.doc
            .get_mut(f.region)
            .unwrap()
            .set_style(StyleProperty::Color, StyleValue::Color(Rgba::BLACK));
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        // span → p → body → region，区域上的定义被顶层内容继承
        assert_eq!(
            resolver.computed(f.span, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::BLACK))
        );
    }

    #[test]
    fn test_region_default_applies_at_tree_root() {
        let mut f = fixture();
        f.doc
            .get_mut(f.region)
            .unwrap()
            .set_style(StyleProperty::Color, StyleValue::Color(Rgba::BLACK));
        f.doc.get_mut(f.region).unwrap().set_style(
            StyleProperty::BackgroundColor,
            StyleValue::Color(Rgba::BLACK),
        );
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        // body 没有父元素，可继承属性经区域级默认落到区域上
        assert_eq!(
            resolver.computed(f.body, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::BLACK))
        );
        // 不允许区域级默认的属性不取区域的值
        assert_eq!(
            resolver.computed(f.body, StyleProperty::BackgroundColor),
            Some(StyleValue::Color(Rgba::TRANSPARENT))
        );
    }

    #[test]
    fn test_region_default_loses_to_ancestor_value() {
        let mut f = fixture();
        f.doc
            .get_mut(f.region)
            .unwrap()
            .set_style(StyleProperty::Color, StyleValue::Color(Rgba::BLACK));
        f.doc
            .get_mut(f.body)
            .unwrap()
            .set_style(StyleProperty::Color, StyleValue::Color(Rgba::WHITE));
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        // 祖先（body）的值优先于区域默认值
        assert_eq!(
            resolver.computed(f.span, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::WHITE))
        );
    }

    #[test]
    fn test_document_initial_value_precedes_intrinsic_default() {
        let mut f = fixture();
        f.doc
            .set_initial_value(StyleProperty::Color, StyleValue::Color(Rgba::BLACK));
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        assert_eq!(
            resolver.computed(f.span, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::BLACK))
        );
    }

    #[test]
    fn test_named_style_reference_on_element() {
        let mut f = fixture();
        let mut bold = NamedStyle::new("bold");
        bold.styles.insert(
            StyleProperty::FontWeight,
            StyleValue::FontWeight(FontWeight::Bold),
        );
        f.doc.put_named_style(bold).unwrap();
        f.doc.get_mut(f.span).unwrap().set_style_ref("bold");
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 0);
        assert_eq!(
            resolver.computed(f.span, StyleProperty::FontWeight),
            Some(StyleValue::FontWeight(FontWeight::Bold))
        );
    }

    #[test]
    fn test_latest_starting_animation_step_wins() {
        let mut f = fixture();
        {
            let p = f.doc.get_mut(f.p).unwrap();
            p.set_timing(Timing {
                begin: Some(TimeOffset::from_seconds(0)),
                end: Some(TimeOffset::from_seconds(10)),
                ..Timing::default()
            });
            p.push_animation(StyleStep {
                property: StyleProperty::Color,
                value: StyleValue::Color(Rgba::BLACK),
                begin: Some(TimeOffset::from_seconds(2)),
                end: None,
            });
            p.push_animation(StyleStep {
                property: StyleProperty::Color,
                value: StyleValue::Color(Rgba::new(255, 0, 0, 255)),
                begin: Some(TimeOffset::from_seconds(5)),
                end: None,
            });
        }
        let timing = ResolvedTiming::resolve(&f.doc);

        // t=3：只有第一条激活
        let resolver = resolver_at(&f.doc, &timing, f.region, 3);
        assert_eq!(
            resolver.computed(f.p, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::BLACK))
        );
        // t=7：两条都激活，起点更晚的覆盖
        let resolver = resolver_at(&f.doc, &timing, f.region, 7);
        assert_eq!(
            resolver.computed(f.p, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::new(255, 0, 0, 255)))
        );
    }

    #[test]
    fn test_tied_animation_steps_resolve_by_document_order() {
        let mut f = fixture();
        {
            let p = f.doc.get_mut(f.p).unwrap();
            p.set_timing(Timing {
                begin: Some(TimeOffset::from_seconds(0)),
                end: Some(TimeOffset::from_seconds(10)),
                ..Timing::default()
            });
            for color in [Rgba::BLACK, Rgba::WHITE] {
                p.push_animation(StyleStep {
                    property: StyleProperty::Color,
                    value: StyleValue::Color(color),
                    begin: Some(TimeOffset::from_seconds(1)),
                    end: None,
                });
            }
        }
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 2);
        // 起点相同，文档顺序靠后的获胜
        assert_eq!(
            resolver.computed(f.p, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::WHITE))
        );
    }

    #[test]
    fn test_animation_step_inherits_down_to_children() {
        let mut f = fixture();
        {
            let p = f.doc.get_mut(f.p).unwrap();
            p.set_timing(Timing {
                begin: Some(TimeOffset::from_seconds(0)),
                end: Some(TimeOffset::from_seconds(10)),
                ..Timing::default()
            });
            p.push_animation(StyleStep {
                property: StyleProperty::Color,
                value: StyleValue::Color(Rgba::BLACK),
                begin: None,
                end: None,
            });
        }
        let timing = ResolvedTiming::resolve(&f.doc);
        let resolver = resolver_at(&f.doc, &timing, f.region, 4);
        // 子元素通过继承看到父元素被动画覆盖后的计算值
        assert_eq!(
            resolver.computed(f.span, StyleProperty::Color),
            Some(StyleValue::Color(Rgba::BLACK))
        );
    }
}
