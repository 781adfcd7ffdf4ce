//! 线性空白（lwsp）归一化。
//!
//! 在模型构建完成后对每个段落执行一次：
//!
//! 1. 仅由制表符/换行构成的文本节点视为源码排版产物，整节点移除
//!    （除非子树要求保留空白）；
//! 2. 其余文本节点内部的连续空白折叠为单个空格；
//! 3. 段落首尾的空格去掉；换行（br）之后的行首空格去掉；相邻文本
//!    节点之间只保留一个空格。紧邻 br 之前的尾随空格保留，保证换行
//!    被合并进段落时词边界不丢失。

use super::{ContentDocument, ContentElement, ElementId, ElementKind};

/// 段落内按文档顺序排列的行内叶子。
enum InlineLeaf {
    Text { id: ElementId, preserve: bool },
    Br,
}

pub(crate) fn collapse_document(doc: &mut ContentDocument) {
    let Some(body) = doc.body() else {
        return;
    };
    let paragraphs: Vec<ElementId> = doc
        .descendants(body)
        .into_iter()
        .filter(|id| {
            doc.get(*id)
                .is_some_and(|el| matches!(el.kind(), ElementKind::P))
        })
        .collect();
    for p in paragraphs {
        collapse_paragraph(doc, p);
    }
}

fn collapse_paragraph(doc: &mut ContentDocument, p: ElementId) {
    let inherited = effective_preserve(doc, p);
    let mut leaves = Vec::new();
    collect_leaves(doc, p, inherited, &mut leaves);

    // 第一遍：移除纯排版空白节点，折叠其余节点内部的空白
    let mut kept = Vec::new();
    for leaf in leaves {
        match leaf {
            InlineLeaf::Text { id, preserve } => {
                if preserve {
                    kept.push(InlineLeaf::Text { id, preserve });
                    continue;
                }
                let Some(text) = doc.get(id).and_then(ContentElement::text) else {
                    continue;
                };
                if text.contains('\n') && text.chars().all(char::is_whitespace) {
                    doc.detach(id);
                    continue;
                }
                let collapsed = collapse_runs(text);
                set_text(doc, id, collapsed);
                kept.push(InlineLeaf::Text { id, preserve });
            }
            InlineLeaf::Br => kept.push(InlineLeaf::Br),
        }
    }

    // 第二遍：处理段落边界、br 边界和相邻文本节点之间的空格
    let mut at_line_start = true;
    let mut prev_text: Option<ElementId> = None;
    for leaf in &kept {
        match leaf {
            InlineLeaf::Text { id, preserve } => {
                if !preserve {
                    if at_line_start {
                        trim_leading_space(doc, *id);
                    } else if let Some(prev) = prev_text {
                        if ends_with_space(doc, prev) {
                            trim_leading_space(doc, *id);
                        }
                    }
                }
                at_line_start = false;
                prev_text = Some(*id);
            }
            InlineLeaf::Br => {
                at_line_start = true;
                prev_text = None;
            }
        }
    }
    // 段落末尾的空格没有相邻行内内容，去掉
    if let Some(InlineLeaf::Text {
        id,
        preserve: false,
    }) = kept.last()
    {
        trim_trailing_space(doc, *id);
    }
}

fn collect_leaves(
    doc: &ContentDocument,
    id: ElementId,
    inherited_preserve: bool,
    out: &mut Vec<InlineLeaf>,
) {
    let Some(el) = doc.get(id) else {
        return;
    };
    let preserve = inherited_preserve || el.space_preserve();
    match el.kind() {
        ElementKind::Text { .. } => out.push(InlineLeaf::Text { id, preserve }),
        ElementKind::Br => out.push(InlineLeaf::Br),
        _ => {
            for child in el.children() {
                collect_leaves(doc, *child, preserve, out);
            }
        }
    }
}

fn effective_preserve(doc: &ContentDocument, id: ElementId) -> bool {
    let mut cursor = Some(id);
    while let Some(current) = cursor {
        let Some(el) = doc.get(current) else {
            return false;
        };
        if el.space_preserve() {
            return true;
        }
        cursor = el.parent();
    }
    false
}

/// 折叠连续空白为单个空格，制表符与换行按空格处理。
fn collapse_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn set_text(doc: &mut ContentDocument, id: ElementId, new_text: String) {
    if let Some(el) = doc.get_mut(id)
        && let ElementKind::Text { text } = &mut el.kind
    {
        *text = new_text;
    }
}

fn ends_with_space(doc: &ContentDocument, id: ElementId) -> bool {
    doc.get(id)
        .and_then(ContentElement::text)
        .is_some_and(|t| t.ends_with(' '))
}

fn trim_leading_space(doc: &mut ContentDocument, id: ElementId) {
    if let Some(current) = doc.get(id).and_then(ContentElement::text) {
        if let Some(stripped) = current.strip_prefix(' ') {
            let stripped = stripped.to_string();
            set_text(doc, id, stripped);
        }
    }
}

fn trim_trailing_space(doc: &mut ContentDocument, id: ElementId) {
    if let Some(current) = doc.get(id).and_then(ContentElement::text) {
        if let Some(stripped) = current.strip_suffix(' ') {
            let stripped = stripped.to_string();
            set_text(doc, id, stripped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(doc: &ContentDocument, id: ElementId) -> Option<String> {
        doc.get(id).and_then(|el| el.text().map(str::to_string))
    }

    fn build_paragraph(doc: &mut ContentDocument) -> ElementId {
        let body = doc.create_element(ElementKind::Body);
        doc.set_body(body).unwrap();
        let p = doc.create_element(ElementKind::P);
        doc.append_child(body, p).unwrap();
        p
    }

    fn push_text(doc: &mut ContentDocument, parent: ElementId, s: &str) -> ElementId {
        let t = doc.create_element(ElementKind::Text {
            text: s.to_string(),
        });
        doc.append_child(parent, t).unwrap();
        t
    }

    #[test]
    fn test_internal_runs_collapse_to_single_space() {
        let mut doc = ContentDocument::new();
        let p = build_paragraph(&mut doc);
        let t = push_text(&mut doc, p, "Hello \t\n  world");
        doc.collapse_whitespace();
        assert_eq!(text_of(&doc, t).unwrap(), "Hello world");
    }

    #[test]
    fn test_formatting_only_nodes_are_removed() {
        let mut doc = ContentDocument::new();
        let p = build_paragraph(&mut doc);
        let t1 = push_text(&mut doc, p, "Hello ");
        let formatting = push_text(&mut doc, p, "\n        ");
        let t2 = push_text(&mut doc, p, "world");
        doc.collapse_whitespace();
        // 排版节点被摘除，词边界空格保留在前一个节点上
        assert_eq!(doc.get(formatting).unwrap().parent(), None);
        assert_eq!(text_of(&doc, t1).unwrap(), "Hello ");
        assert_eq!(text_of(&doc, t2).unwrap(), "world");
    }

    #[test]
    fn test_space_around_br_is_neither_lost_nor_duplicated() {
        let mut doc = ContentDocument::new();
        let p = build_paragraph(&mut doc);
        let t1 = push_text(&mut doc, p, "line one ");
        let br = doc.create_element(ElementKind::Br);
        doc.append_child(p, br).unwrap();
        let t2 = push_text(&mut doc, p, " line two");
        doc.collapse_whitespace();
        // br 之前的尾随空格保留（段落合并时的词边界），br 之后的行首空格去掉
        assert_eq!(text_of(&doc, t1).unwrap(), "line one ");
        assert_eq!(text_of(&doc, t2).unwrap(), "line two");
    }

    #[test]
    fn test_paragraph_edges_are_trimmed() {
        let mut doc = ContentDocument::new();
        let p = build_paragraph(&mut doc);
        let t = push_text(&mut doc, p, "  padded  ");
        doc.collapse_whitespace();
        assert_eq!(text_of(&doc, t).unwrap(), "padded");
    }

    #[test]
    fn test_adjacent_text_nodes_share_one_space() {
        let mut doc = ContentDocument::new();
        let p = build_paragraph(&mut doc);
        let span = doc.create_element(ElementKind::Span);
        doc.append_child(p, span).unwrap();
        let t1 = push_text(&mut doc, span, "Hello ");
        let t2 = push_text(&mut doc, p, " world");
        doc.collapse_whitespace();
        assert_eq!(text_of(&doc, t1).unwrap(), "Hello ");
        assert_eq!(text_of(&doc, t2).unwrap(), "world");
    }

    #[test]
    fn test_preserve_disables_collapsing() {
        let mut doc = ContentDocument::new();
        let p = build_paragraph(&mut doc);
        doc.get_mut(p).unwrap().set_space_preserve(true);
        let t = push_text(&mut doc, p, "  keep   this\n");
        doc.collapse_whitespace();
        assert_eq!(text_of(&doc, t).unwrap(), "  keep   this\n");
    }
}
