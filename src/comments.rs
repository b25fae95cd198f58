//! Associating retained comments with the statements and elements they
//! describe.
//!
//! A comment group attaches to a target in one of two ways:
//! 1. the group's last line sits immediately above the target, with no
//!    blank line between (and the group is not already claimed by an
//!    earlier target), or
//! 2. the group starts on the same line as the target, after its last
//!    token.
//!
//! Groups satisfying neither rule stay unattached. Targets are the
//! statements of a [File] plus the top-level elements of each CREATE TABLE,
//! in source order.

use std::collections::BTreeMap;

use crate::ast::{AstNode, Comment, CommentGroup, File, StatementKind};
use crate::error::Span;

/// Fold a flat comment list into groups: adjacent single-line comments not
/// separated by a blank line merge; every block comment is its own group.
pub fn group_comments(comments: Vec<Comment>) -> Vec<CommentGroup> {
    let mut groups: Vec<CommentGroup> = Vec::new();
    for comment in comments {
        if let Some(group) = groups.last_mut() {
            if is_adjacent(group, &comment) {
                group.comments.push(comment);
                continue;
            }
        }
        groups.push(CommentGroup {
            comments: vec![comment],
        });
    }
    groups
}

fn is_adjacent(group: &CommentGroup, next: &Comment) -> bool {
    let Some(last) = group.comments.last() else {
        return false;
    };
    let (Some(prev_span), Some(next_span)) = (last.span, next.span) else {
        return false;
    };
    last.is_line() && next.is_line() && next_span.start.line == prev_span.end.line
}

/// The comment-to-node association for one parsed file. Keys are target
/// spans; [Span]'s ordering keeps the map in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentMap {
    map: BTreeMap<Span, Vec<CommentGroup>>,
}

impl CommentMap {
    /// Attach each comment group of `file` to the nearest statement or
    /// CREATE TABLE element it describes.
    pub fn build(file: &File) -> CommentMap {
        let targets = Self::targets(file);
        let mut map: BTreeMap<Span, Vec<CommentGroup>> = BTreeMap::new();
        let mut attached = vec![false; file.comments.len()];

        for target in &targets {
            for (index, group) in file.comments.iter().enumerate() {
                if attached[index] {
                    continue;
                }
                if Self::is_leading(group, *target) || Self::is_trailing(group, *target) {
                    attached[index] = true;
                    map.entry(*target).or_default().push(group.clone());
                }
            }
        }
        CommentMap { map }
    }

    /// The comment groups attached to the node with this span, in source
    /// order.
    pub fn get(&self, node: &dyn AstNode) -> &[CommentGroup] {
        node.span()
            .and_then(|span| self.map.get(&span))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Span, &[CommentGroup])> {
        self.map.iter().map(|(span, groups)| (span, groups.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Statements, plus each CREATE TABLE element, in source order.
    fn targets(file: &File) -> Vec<Span> {
        let mut targets = Vec::new();
        for stmt in &file.stmts {
            if let Some(span) = stmt.span() {
                targets.push(span);
            }
            if let StatementKind::CreateTable(create) = &stmt.kind {
                for element in &create.elements {
                    if let Some(span) = element.span() {
                        targets.push(span);
                    }
                }
            }
        }
        targets
    }

    /// Rule 1: the group ends on the line directly above the target.
    fn is_leading(group: &CommentGroup, target: Span) -> bool {
        let (Some(span), Some(last_line)) = (group.span(), group.last_line()) else {
            return false;
        };
        span.start < target.start && last_line + 1 == target.start.line
    }

    /// Rule 2: the group starts on the target's last line, after its end.
    fn is_trailing(group: &CommentGroup, target: Span) -> bool {
        let Some(span) = group.span() else {
            return false;
        };
        span.start.line == target.end.line && span.start.column >= target.end.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;
    use crate::error::Pos;
    use crate::parser::{Parser, ParserOptions};

    fn parse_file(sql: &str) -> File {
        Parser::new_with_options(
            sql,
            &GenericDialect,
            ParserOptions {
                parse_comments: true,
            },
        )
        .unwrap()
        .parse_file()
        .unwrap()
    }

    fn comment(text: &str, start: (usize, usize), end: (usize, usize)) -> Comment {
        Comment {
            text: text.to_string(),
            span: Some(Span::new(
                Pos::new(start.0, start.1),
                Pos::new(end.0, end.1),
            )),
        }
    }

    #[test]
    fn test_grouping_merges_adjacent_line_comments() {
        let groups = group_comments(vec![
            comment(" a\n", (1, 0), (2, 0)),
            comment(" b\n", (2, 0), (3, 0)),
            // blank line
            comment(" c\n", (4, 0), (5, 0)),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].comments.len(), 2);
        assert_eq!(groups[0].text(), " a\n b\n");
    }

    #[test]
    fn test_block_comments_stay_single() {
        let groups = group_comments(vec![
            comment(" block ", (1, 0), (1, 11)),
            comment(" line\n", (2, 0), (3, 0)),
        ]);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_leading_comment_attaches_to_statement() {
        let file = parse_file("-- fetch everything\nSELECT * FROM t");
        assert_eq!(file.comments.len(), 1);
        let map = CommentMap::build(&file);
        let groups = map.get(&file.stmts[0]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text(), " fetch everything\n");
    }

    #[test]
    fn test_blank_line_detaches() {
        let file = parse_file("-- far away\n\nSELECT * FROM t");
        let map = CommentMap::build(&file);
        assert!(map.get(&file.stmts[0]).is_empty());
        assert_eq!(file.comments.len(), 1);
    }

    #[test]
    fn test_create_table_element_comments() {
        let sql = "\
CREATE TABLE persons (
    -- surrogate key
    person_id UUID PRIMARY KEY,
    first_name varchar(255) -- display name
)";
        let file = parse_file(sql);
        let map = CommentMap::build(&file);

        let create = file.stmts[0].kind.as_create_table().unwrap();
        let id_groups = map.get(&create.elements[0]);
        assert_eq!(id_groups.len(), 1);
        assert_eq!(id_groups[0].text(), " surrogate key\n");

        let name_groups = map.get(&create.elements[1]);
        assert_eq!(name_groups.len(), 1);
        assert_eq!(name_groups[0].text(), " display name\n");
    }

    #[test]
    fn test_trailing_comment_on_statement_line() {
        let file = parse_file("SELECT * FROM t -- all rows\n");
        let map = CommentMap::build(&file);
        let groups = map.get(&file.stmts[0]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text(), " all rows\n");
    }

    #[test]
    fn test_unattached_comment_stays_in_file() {
        let file = parse_file("SELECT 1;\n\n\n-- floating, far from anything\n\n\nSELECT 2");
        let map = CommentMap::build(&file);
        assert!(map.get(&file.stmts[0]).is_empty());
        assert!(map.get(&file.stmts[1]).is_empty());
        assert_eq!(file.comments.len(), 1);
    }

    #[test]
    fn test_comments_dropped_without_option() {
        let mut parser = Parser::new("-- note\nSELECT 1", &GenericDialect).unwrap();
        let file = parser.parse_file().unwrap();
        assert!(file.comments.is_empty());
        assert!(CommentMap::build(&file).is_empty());
    }

    #[test]
    fn test_map_iterates_in_source_order() {
        let file = parse_file("-- first\nSELECT 1;\n\n-- second\nSELECT 2;\n");
        let map = CommentMap::build(&file);
        assert_eq!(map.len(), 2);
        let texts: Vec<String> = map
            .iter()
            .map(|(_, groups)| groups[0].text())
            .collect();
        assert_eq!(texts, vec![" first\n", " second\n"]);
    }

    #[test]
    fn test_block_comment_attaches_as_leading() {
        let file = parse_file("/* described\n   here */\nSELECT 1");
        let map = CommentMap::build(&file);
        let groups = map.get(&file.stmts[0]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text(), " described\n   here ");
    }
}
