//! 时间解析：把元素的本地时间属性换算为文档时间轴上的绝对激活区间。
//!
//! 自根向下做一次遍历：并行容器的子元素以容器起点为本地零点，顺序
//! 容器的子元素首尾相接。全部换算用有理数完成，嵌套容器不会引入
//! 舍入漂移。

use std::collections::HashMap;

use crate::model::{ContentDocument, ContentElement, ElementId, TimeContainer};
use crate::time::{TimeInterval, TimeOffset};

/// 一次时间解析的结果：元素句柄到绝对激活区间的映射。
///
/// 映射值为 `None`（或句柄缺失）表示元素永不激活：区间为空、起点不
/// 早于终点、或祖先本身永不激活，都归入这一类，按降级策略静默排除。
#[derive(Debug, Clone)]
pub struct ResolvedTiming {
    intervals: HashMap<ElementId, Option<TimeInterval>>,
}

impl ResolvedTiming {
    /// 对整个文档做一次时间解析。
    ///
    /// 区域不在 body 的包含链上，各自直接按根时间轴解析；区域的区间
    /// 只约束区域何时可以被绘制，与指派给它的内容无关。
    #[must_use]
    pub fn resolve(doc: &ContentDocument) -> Self {
        let mut intervals = HashMap::new();
        let root = TimeInterval::new(TimeOffset::ZERO, doc.duration());

        for (_, region_id) in doc.regions() {
            let interval = doc
                .get(region_id)
                .and_then(|el| child_interval(el, &root, root.begin));
            intervals.insert(region_id, interval);
        }

        if let Some(body) = doc.body() {
            resolve_subtree(doc, body, &root, root.begin, &mut intervals);
        }

        Self { intervals }
    }

    /// 读取某元素的绝对激活区间。`None` 表示永不激活。
    #[must_use]
    pub fn interval(&self, id: ElementId) -> Option<TimeInterval> {
        self.intervals.get(&id).copied().flatten()
    }

    /// 迭代所有已解析且会激活的元素区间。
    pub fn active_intervals(&self) -> impl Iterator<Item = (ElementId, TimeInterval)> + '_ {
        self.intervals
            .iter()
            .filter_map(|(id, interval)| interval.map(|i| (*id, i)))
    }
}

/// 计算单个元素的绝对激活区间。
///
/// 便捷入口，内部仍执行一次整树解析（顺序容器中元素的区间依赖前面
/// 兄弟的终点，无法孤立计算）。批量查询请直接使用 [`ResolvedTiming`]。
#[must_use]
pub fn compute_active_interval(doc: &ContentDocument, id: ElementId) -> Option<TimeInterval> {
    ResolvedTiming::resolve(doc).interval(id)
}

/// 在父区间内解析一个子树。返回该元素（未被父区间裁剪前）的终点，
/// 供顺序容器确定下一个兄弟的本地零点；永不激活时返回 `None`。
fn resolve_subtree(
    doc: &ContentDocument,
    id: ElementId,
    parent: &TimeInterval,
    local_zero: TimeOffset,
    out: &mut HashMap<ElementId, Option<TimeInterval>>,
) -> Option<Option<TimeOffset>> {
    let el = doc.get(id)?;
    let Some(raw) = raw_interval(el, parent, local_zero) else {
        mark_never(doc, id, out);
        return None;
    };
    let Some(interval) = parent.intersect(&raw) else {
        // 被父区间整体裁掉的子元素不激活，但仍占据顺序容器中的位置，
        // 后续兄弟照常从它的原始终点接续
        mark_never(doc, id, out);
        return Some(raw_end(el, local_zero));
    };
    out.insert(id, Some(interval));

    match el.timing().container {
        TimeContainer::Par => {
            for child in el.children() {
                resolve_subtree(doc, *child, &interval, interval.begin, out);
            }
        }
        TimeContainer::Seq => {
            let mut zero = Some(interval.begin);
            for child in el.children() {
                match zero {
                    Some(z) => {
                        let child_end = resolve_subtree(doc, *child, &interval, z, out);
                        if let Some(end) = child_end {
                            // 开放终点的子元素吞掉容器剩余时间
                            zero = end;
                        }
                    }
                    // 前一个兄弟延伸到容器末尾，后续兄弟不再激活
                    None => mark_never(doc, *child, out),
                }
            }
        }
    }
    Some(raw_end(el, local_zero))
}

/// 元素本地时间属性换算出的未裁剪绝对区间，`begin >= end` 时为 `None`。
fn raw_interval(
    el: &ContentElement,
    parent: &TimeInterval,
    local_zero: TimeOffset,
) -> Option<TimeInterval> {
    let timing = el.timing();
    let begin = local_zero + timing.begin.unwrap_or(TimeOffset::ZERO);
    let end = match (timing.end, timing.dur) {
        (Some(end), _) => Some(local_zero + end),
        (None, Some(dur)) => Some(begin + dur),
        (None, None) => parent.end,
    };
    let raw = TimeInterval::new(begin, end);
    if raw.is_empty() { None } else { Some(raw) }
}

/// 裁剪到父区间的绝对激活区间。
fn child_interval(
    el: &ContentElement,
    parent: &TimeInterval,
    local_zero: TimeOffset,
) -> Option<TimeInterval> {
    parent.intersect(&raw_interval(el, parent, local_zero)?)
}

/// 元素未经父区间裁剪的绝对终点，`None` 表示开放。
fn raw_end(el: &ContentElement, local_zero: TimeOffset) -> Option<TimeOffset> {
    let timing = el.timing();
    match (timing.end, timing.dur) {
        (Some(end), _) => Some(local_zero + end),
        (None, Some(dur)) => {
            Some(local_zero + timing.begin.unwrap_or(TimeOffset::ZERO) + dur)
        }
        (None, None) => None,
    }
}

/// 把一个子树整体标记为永不激活。
fn mark_never(
    doc: &ContentDocument,
    id: ElementId,
    out: &mut HashMap<ElementId, Option<TimeInterval>>,
) {
    for descendant in doc.descendants(id) {
        out.insert(descendant, None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Timing};

    fn seconds(s: i64) -> TimeOffset {
        TimeOffset::from_seconds(s)
    }

    fn timed(begin: Option<i64>, end: Option<i64>, dur: Option<i64>) -> Timing {
        Timing {
            begin: begin.map(seconds),
            end: end.map(seconds),
            dur: dur.map(seconds),
            container: TimeContainer::Par,
        }
    }

    struct Fixture {
        doc: ContentDocument,
        body: ElementId,
    }

    fn fixture() -> Fixture {
        let mut doc = ContentDocument::new();
        let body = doc.create_element(ElementKind::Body);
        doc.set_body(body).unwrap();
        Fixture { doc, body }
    }

    #[test]
    fn test_parallel_children_share_container_origin() {
        let mut f = fixture();
        let div = f.doc.create_element(ElementKind::Div);
        f.doc.get_mut(div).unwrap().set_timing(timed(Some(10), Some(30), None));
        f.doc.append_child(f.body, div).unwrap();
        let p = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p).unwrap().set_timing(timed(Some(2), Some(5), None));
        f.doc.append_child(div, p).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        let interval = timing.interval(p).unwrap();
        assert_eq!(interval.begin, seconds(12));
        assert_eq!(interval.end, Some(seconds(15)));
    }

    #[test]
    fn test_sequential_children_chain_end_to_end() {
        let mut f = fixture();
        let div = f.doc.create_element(ElementKind::Div);
        f.doc.get_mut(div).unwrap().set_timing(Timing {
            container: TimeContainer::Seq,
            ..Timing::default()
        });
        f.doc.append_child(f.body, div).unwrap();
        let p1 = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p1).unwrap().set_timing(timed(None, None, Some(3)));
        f.doc.append_child(div, p1).unwrap();
        let p2 = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p2).unwrap().set_timing(timed(None, None, Some(4)));
        f.doc.append_child(div, p2).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        let i1 = timing.interval(p1).unwrap();
        let i2 = timing.interval(p2).unwrap();
        assert_eq!((i1.begin, i1.end), (seconds(0), Some(seconds(3))));
        assert_eq!((i2.begin, i2.end), (seconds(3), Some(seconds(7))));
    }

    #[test]
    fn test_dur_computes_end() {
        let mut f = fixture();
        let p = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p).unwrap().set_timing(timed(Some(5), None, Some(2)));
        f.doc.append_child(f.body, p).unwrap();

        let interval = compute_active_interval(&f.doc, p).unwrap();
        assert_eq!((interval.begin, interval.end), (seconds(5), Some(seconds(7))));
    }

    #[test]
    fn test_begin_after_end_is_never_active() {
        let mut f = fixture();
        let p = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p).unwrap().set_timing(timed(Some(5), Some(3), None));
        f.doc.append_child(f.body, p).unwrap();
        let t = f.doc.create_element(ElementKind::Text {
            text: "ghost".to_string(),
        });
        f.doc.append_child(p, t).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        assert!(timing.interval(p).is_none());
        // 子树随之永不激活
        assert!(timing.interval(t).is_none());
    }

    #[test]
    fn test_child_clipped_to_parent_interval() {
        let mut f = fixture();
        let div = f.doc.create_element(ElementKind::Div);
        f.doc.get_mut(div).unwrap().set_timing(timed(Some(0), Some(10), None));
        f.doc.append_child(f.body, div).unwrap();
        let p = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p).unwrap().set_timing(timed(Some(8), Some(20), None));
        f.doc.append_child(div, p).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        let interval = timing.interval(p).unwrap();
        assert_eq!((interval.begin, interval.end), (seconds(8), Some(seconds(10))));
    }

    #[test]
    fn test_open_end_clips_to_document_duration() {
        let mut f = fixture();
        f.doc.set_duration(Some(seconds(60)));
        let p = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p).unwrap().set_timing(timed(Some(50), None, None));
        f.doc.append_child(f.body, p).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        let interval = timing.interval(p).unwrap();
        assert_eq!((interval.begin, interval.end), (seconds(50), Some(seconds(60))));
    }

    #[test]
    fn test_region_resolves_on_root_timeline() {
        let mut f = fixture();
        let region = f.doc.create_element(ElementKind::Region {
            id: "r1".to_string(),
        });
        f.doc
            .get_mut(region)
            .unwrap()
            .set_timing(timed(Some(2), Some(9), None));
        f.doc.put_region(region).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        let interval = timing.interval(region).unwrap();
        assert_eq!((interval.begin, interval.end), (seconds(2), Some(seconds(9))));
    }

    #[test]
    fn test_seq_child_clipped_out_still_advances_the_chain() {
        let mut f = fixture();
        let div = f.doc.create_element(ElementKind::Div);
        f.doc.get_mut(div).unwrap().set_timing(Timing {
            begin: Some(seconds(0)),
            end: Some(seconds(10)),
            dur: None,
            container: TimeContainer::Seq,
        });
        f.doc.append_child(f.body, div).unwrap();
        // 第一个子元素整体落在容器区间之外
        let p1 = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p1).unwrap().set_timing(timed(Some(12), Some(14), None));
        f.doc.append_child(div, p1).unwrap();
        // 第二个子元素从前一个的原始终点（14s）接续，同样在容器之外
        let p2 = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p2).unwrap().set_timing(timed(None, None, Some(3)));
        f.doc.append_child(div, p2).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        assert!(timing.interval(p1).is_none());
        assert!(timing.interval(p2).is_none());
    }

    #[test]
    fn test_open_seq_child_starves_later_siblings() {
        let mut f = fixture();
        let div = f.doc.create_element(ElementKind::Div);
        f.doc.get_mut(div).unwrap().set_timing(Timing {
            container: TimeContainer::Seq,
            ..Timing::default()
        });
        f.doc.append_child(f.body, div).unwrap();
        let p1 = f.doc.create_element(ElementKind::P);
        f.doc.append_child(div, p1).unwrap();
        let p2 = f.doc.create_element(ElementKind::P);
        f.doc.get_mut(p2).unwrap().set_timing(timed(None, None, Some(4)));
        f.doc.append_child(div, p2).unwrap();

        let timing = ResolvedTiming::resolve(&f.doc);
        assert!(timing.interval(p1).is_some());
        assert!(timing.interval(p2).is_none());
    }
}
