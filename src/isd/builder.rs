//! ISD 构建：时间解析与样式级联的编排。
//!
//! 单次 [`Isd::from_model`] 对共享文档只读，这使得按时间点的并行
//! 扇出天然安全：每个工作单元独享自己的输出 ISD 和级联缓存，彼此
//! 之间没有可变共享状态，也不需要锁。文档的修改（过滤器）与 ISD
//! 生成是互斥的两个阶段，由调用方纪律保证。

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::cascade::StyleResolver;
use super::{Isd, IsdElement, IsdElementKind, IsdRegion};
use crate::model::{ContentDocument, ElementId, ElementKind};
use crate::style::value::{DisplayMode, StyleValue};
use crate::style::StyleProperty;
use crate::time::TimeOffset;
use crate::timing::ResolvedTiming;

use strum::IntoEnumIterator;

impl Isd {
    /// 生成文档在 `offset` 瞬间的完全解析快照。
    ///
    /// 纯函数：不修改文档，重复调用产出结构与值完全相等的 ISD。
    #[must_use]
    pub fn from_model(doc: &ContentDocument, offset: TimeOffset) -> Self {
        let timing = ResolvedTiming::resolve(doc);
        Self::build(doc, &timing, offset)
    }

    /// 同 [`Isd::from_model`]，但复用调用方已有的时间解析结果。
    ///
    /// 自行按多个时间点循环构建快照的调用方可以用它省掉每次调用的
    /// 整树时间解析；`timing` 必须解析自同一份未经修改的文档。
    #[must_use]
    pub fn from_model_with_timing(
        doc: &ContentDocument,
        timing: &ResolvedTiming,
        offset: TimeOffset,
    ) -> Self {
        Self::build(doc, timing, offset)
    }

    /// 枚举文档的全部显著时间点：任何元素激活区间的起点或终点，以及
    /// 动画步的边界。升序去重；文档非空时恒包含 0。
    ///
    /// 相邻两个显著时间点之间 ISD 不变。有理数比较是精确的，不做
    /// 邻近合并。
    #[must_use]
    pub fn significant_times(doc: &ContentDocument) -> Vec<TimeOffset> {
        let timing = ResolvedTiming::resolve(doc);
        collect_significant_times(doc, &timing)
    }

    /// 在每个显著时间点上各生成一个 ISD，覆盖整条文档时间轴。
    ///
    /// 每个时间点代表它所开启的不变窗口。`multithreaded` 为真时按
    /// 时间点做 fork-join 扇出，结果仍按时间点升序重组；两条路径
    /// 对任何输入产出完全相同的序列，单线程路径是语义基准。
    #[must_use]
    pub fn generate_isd_sequence(
        doc: &ContentDocument,
        multithreaded: bool,
    ) -> Vec<(TimeOffset, Self)> {
        let timing = ResolvedTiming::resolve(doc);
        let times = collect_significant_times(doc, &timing);
        debug!(
            count = times.len(),
            multithreaded, "在显著时间点上生成 ISD 序列"
        );
        if multithreaded {
            // rayon 的 collect 按输入顺序重组，与完成顺序无关
            times
                .par_iter()
                .map(|t| (*t, Self::build(doc, &timing, *t)))
                .collect()
        } else {
            times
                .iter()
                .map(|t| (*t, Self::build(doc, &timing, *t)))
                .collect()
        }
    }

    /// 在既有的时间解析结果上构建单个瞬间的快照。
    fn build(doc: &ContentDocument, timing: &ResolvedTiming, offset: TimeOffset) -> Self {
        let mut regions = BTreeMap::new();
        for (region_id, region_el) in doc.regions() {
            let Some(region_interval) = timing.interval(region_el) else {
                continue;
            };
            if !region_interval.contains(offset) {
                continue;
            }
            // 级联缓存的作用域是一个区域上下文
            let resolver = StyleResolver::new(doc, timing, offset, region_el);
            let styles = computed_styles(doc, &resolver, region_el);
            let contents = doc
                .body()
                .and_then(|body| copy_content(doc, timing, &resolver, body, None, region_id, offset));
            regions.insert(
                region_id.to_string(),
                IsdRegion {
                    id: region_id.to_string(),
                    styles,
                    contents: contents.into_iter().collect(),
                },
            );
        }
        Self { offset, regions }
    }
}

fn collect_significant_times(doc: &ContentDocument, timing: &ResolvedTiming) -> Vec<TimeOffset> {
    let mut times = BTreeSet::new();
    if doc.has_content() {
        times.insert(TimeOffset::ZERO);
    }
    for (id, interval) in timing.active_intervals() {
        times.insert(interval.begin);
        if let Some(end) = interval.end {
            times.insert(end);
        }
        let Some(el) = doc.get(id) else { continue };
        for step in el.animations() {
            let begin = interval.begin + step.begin.unwrap_or(TimeOffset::ZERO);
            if interval.contains(begin) {
                times.insert(begin);
            }
            if let Some(end) = step.end {
                let end = interval.begin + end;
                if interval.contains(end) || interval.end == Some(end) {
                    times.insert(end);
                }
            }
        }
    }
    times.into_iter().collect()
}

/// 递归复制一个内容子树到 ISD：保持子节点顺序，样式全部物化为计算值，
/// 没有可呈现叶子的子树整体裁剪。
fn copy_content(
    doc: &ContentDocument,
    timing: &ResolvedTiming,
    resolver: &StyleResolver<'_>,
    id: ElementId,
    inherited_region: Option<&str>,
    target_region: &str,
    offset: TimeOffset,
) -> Option<IsdElement> {
    let el = doc.get(id)?;
    let interval = timing.interval(id)?;
    if !interval.contains(offset) {
        return None;
    }
    if let Some(region_ref) = el.region_ref() {
        if doc.region(region_ref).is_none() {
            // 引用不存在的区域按"永不呈现"降级，不中止整个文档
            warn!(
                element = el.kind().name(),
                region = region_ref,
                "元素引用了不存在的区域，排除出 ISD"
            );
            return None;
        }
        if region_ref != target_region {
            return None;
        }
    }
    let assoc = el.region_ref().or(inherited_region);

    match el.kind() {
        ElementKind::Text { text } => {
            if assoc != Some(target_region) || text.is_empty() {
                return None;
            }
            Some(IsdElement {
                kind: IsdElementKind::Text,
                text: Some(text.clone()),
                styles: BTreeMap::new(),
                children: Vec::new(),
                source: Some(id),
            })
        }
        ElementKind::Br => {
            if assoc != Some(target_region) {
                return None;
            }
            let styles = computed_styles(doc, resolver, id);
            if is_display_none(&styles) {
                return None;
            }
            Some(IsdElement {
                kind: IsdElementKind::Br,
                text: None,
                styles,
                children: Vec::new(),
                source: Some(id),
            })
        }
        ElementKind::Region { .. } => None,
        kind => {
            let styles = computed_styles(doc, resolver, id);
            if is_display_none(&styles) {
                return None;
            }
            let children: Vec<IsdElement> = el
                .children()
                .iter()
                .filter_map(|child| {
                    copy_content(doc, timing, resolver, *child, assoc, target_region, offset)
                })
                .collect();
            // 没有存活后代的元素不输出空壳
            if children.is_empty() {
                return None;
            }
            Some(IsdElement {
                kind: match kind {
                    ElementKind::Body => IsdElementKind::Body,
                    ElementKind::Div => IsdElementKind::Div,
                    ElementKind::P => IsdElementKind::P,
                    _ => IsdElementKind::Span,
                },
                text: None,
                styles,
                children,
                source: Some(id),
            })
        }
    }
}

/// 物化一个元素的全部适用属性。
fn computed_styles(
    doc: &ContentDocument,
    resolver: &StyleResolver<'_>,
    id: ElementId,
) -> BTreeMap<StyleProperty, StyleValue> {
    let Some(el) = doc.get(id) else {
        return BTreeMap::new();
    };
    let mask = el.kind().mask();
    StyleProperty::iter()
        .filter(|prop| prop.applies_to().contains(mask))
        .filter_map(|prop| resolver.computed(id, prop).map(|value| (prop, value)))
        .collect()
}

fn is_display_none(styles: &BTreeMap<StyleProperty, StyleValue>) -> bool {
    matches!(
        styles.get(&StyleProperty::Display),
        Some(StyleValue::Display(DisplayMode::None))
    )
}
