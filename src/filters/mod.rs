//! ISD 后处理过滤器。
//!
//! 过滤器就地修改 ISD，在 ISD 生成之后、写出器消费之前运行。它们
//! 不回到内容文档做级联，只在计算值层面增删。

use std::collections::HashSet;

use tracing::debug;

use crate::config::{FilterFlags, FilterPipelineOptions};
use crate::isd::{Isd, IsdElement, IsdElementKind};
use crate::model::ContentDocument;
use crate::style::{StyleProperty, StyleValue};

/// 按选项依次执行启用的过滤器。
pub fn apply_pipeline(isd: &mut Isd, doc: &ContentDocument, options: &FilterPipelineOptions) {
    if options.flags.contains(FilterFlags::MERGE_REGIONS) {
        merge_regions(isd);
    }
    if options.flags.contains(FilterFlags::MERGE_PARAGRAPHS) {
        merge_paragraphs(isd);
    }
    if options.flags.contains(FilterFlags::STRIP_UNSUPPORTED) {
        strip_unsupported(isd, &options.supported_properties);
    }
    if options.flags.contains(FilterFlags::REMOVE_DEFAULTS) {
        remove_defaults(isd, doc);
    }
}

/// 把所有区域的内容并入标识符最小的区域，其余区域移除。
///
/// 目标区域自身的样式保持不变。幂等：单区域（或空）ISD 上是空操作。
pub fn merge_regions(isd: &mut Isd) {
    if isd.regions.len() <= 1 {
        return;
    }
    let mut iter = std::mem::take(&mut isd.regions).into_iter();
    let Some((target_id, mut target)) = iter.next() else {
        return;
    };
    let mut moved = 0usize;
    for (_, region) in iter {
        moved += region.contents.len();
        target.contents.extend(region.contents);
    }
    debug!(region = %target_id, moved, "合并区域内容");
    isd.regions.insert(target_id, target);
}

/// 把每个区域内的全部段落合并为一个段落，段落之间以换行分隔。
///
/// 合并后的段落沿用首个段落的样式；分隔换行是合成节点，不带样式
/// 也不溯源。幂等：单段落区域上再跑一遍不再改变结构。
pub fn merge_paragraphs(isd: &mut Isd) {
    for region in isd.regions.values_mut() {
        for content in &mut region.contents {
            merge_paragraphs_under(content);
        }
    }
}

fn merge_paragraphs_under(root: &mut IsdElement) {
    let mut paragraphs = Vec::new();
    collect_paragraphs(root, &mut paragraphs);
    let Some(first) = paragraphs.first() else {
        return;
    };
    let mut merged = IsdElement {
        kind: IsdElementKind::P,
        text: None,
        styles: first.styles.clone(),
        children: Vec::new(),
        source: first.source,
    };
    for (index, paragraph) in paragraphs.into_iter().enumerate() {
        if index > 0 {
            merged.children.push(IsdElement {
                kind: IsdElementKind::Br,
                text: None,
                styles: Default::default(),
                children: Vec::new(),
                source: None,
            });
        }
        merged.children.extend(paragraph.children);
    }
    root.children = vec![merged];
}

fn collect_paragraphs(el: &IsdElement, out: &mut Vec<IsdElement>) {
    if el.kind == IsdElementKind::P {
        out.push(el.clone());
        return;
    }
    for child in &el.children {
        collect_paragraphs(child, out);
    }
}

/// 删除不在支持集合内的样式属性。
pub fn strip_unsupported(isd: &mut Isd, supported: &[StyleProperty]) {
    let keep: HashSet<StyleProperty> = supported.iter().copied().collect();
    for region in isd.regions.values_mut() {
        region.styles.retain(|prop, _| keep.contains(prop));
        for content in &mut region.contents {
            strip_element(content, &keep);
        }
    }
}

fn strip_element(el: &mut IsdElement, keep: &HashSet<StyleProperty>) {
    el.styles.retain(|prop, _| keep.contains(prop));
    for child in &mut el.children {
        strip_element(child, keep);
    }
}

/// 删除等于默认值的计算样式。
///
/// 默认值指文档初始值映射中的取值，没有时退回属性的固有初始值，
/// 与级联第 4、5 步使用同一来源，因此对无覆盖的属性恰好互逆。
pub fn remove_defaults(isd: &mut Isd, doc: &ContentDocument) {
    for region in isd.regions.values_mut() {
        remove_default_entries(&mut region.styles, doc);
        for content in &mut region.contents {
            remove_defaults_element(content, doc);
        }
    }
}

fn remove_defaults_element(el: &mut IsdElement, doc: &ContentDocument) {
    remove_default_entries(&mut el.styles, doc);
    for child in &mut el.children {
        remove_defaults_element(child, doc);
    }
}

fn remove_default_entries(
    styles: &mut std::collections::BTreeMap<StyleProperty, StyleValue>,
    doc: &ContentDocument,
) {
    styles.retain(|prop, value| {
        let default = doc
            .initial_value(*prop)
            .cloned()
            .unwrap_or_else(|| prop.initial_value());
        *value != default
    });
}
