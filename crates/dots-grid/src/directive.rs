//! Source scanning: `%` directives, comments and context-sensitive
//! classification.

use std::path::PathBuf;

use dots_core::{Direction, LoadError, Operator};
use indexmap::{IndexMap, IndexSet};

use crate::cell::{Cell, CellKind, OperatorStyle};
use crate::grid::Grid;

/// A `%!path glyph` include.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Include {
    pub path: PathBuf,
    pub glyph: char,
}

/// Everything the `%` lines of one file declare.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Directives {
    pub warps: IndexSet<char>,
    pub includes: Vec<Include>,
    pub export: Option<char>,
}

/// Raw text of one file, split into rows, with directive lines and
/// comment tails masked out.
pub(crate) struct SourceText {
    rows: Vec<Vec<char>>,
    masked: Vec<Vec<bool>>,
    pub directives: Directives,
}

impl SourceText {
    /// Split `text` into rows and collect its directives.
    pub fn parse(text: &str, scope: &str) -> Result<Self, LoadError> {
        let mut rows = Vec::new();
        let mut masked = Vec::new();
        let mut directives = Directives::default();
        let mut seen: IndexMap<char, &'static str> = IndexMap::new();

        for (idx, line) in text.lines().enumerate() {
            let chars: Vec<char> = line.trim_end_matches('\r').chars().collect();
            let trimmed = line.trim();
            let mask = if trimmed.starts_with('%') {
                parse_directive(trimmed, idx + 1, scope, &mut directives, &mut seen)?;
                vec![true; chars.len()]
            } else {
                let cut = comment_start(&chars).unwrap_or(chars.len());
                (0..chars.len()).map(|x| x >= cut).collect()
            };
            rows.push(chars);
            masked.push(mask);
        }

        Ok(Self {
            rows,
            masked,
            directives,
        })
    }

    fn glyph(&self, x: i32, y: i32) -> Option<char> {
        let (xu, yu) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        if *self.masked.get(yu)?.get(xu)? {
            return None;
        }
        self.rows[yu].get(xu).copied()
    }

    /// Classify every cell. `export` is the glyph to treat as this
    /// file's library export, if it is being loaded as a library.
    pub fn classify(&self, export: Option<char>) -> Grid {
        let literal = self.literal_mask();
        let links: IndexSet<char> = self.directives.includes.iter().map(|i| i.glyph).collect();

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(|(x, &glyph)| {
                        let kind = if self.masked[y][x] {
                            CellKind::Comment
                        } else if literal[y][x] {
                            CellKind::Text
                        } else {
                            self.classify_at(x as i32, y as i32, glyph, &links, export)
                        };
                        Cell { glyph, kind }
                    })
                    .collect()
            })
            .collect();
        Grid::from_rows(rows)
    }

    fn classify_at(
        &self,
        x: i32,
        y: i32,
        glyph: char,
        links: &IndexSet<char>,
        export: Option<char>,
    ) -> CellKind {
        if let Some(op) = Operator::from_glyph(glyph) {
            match (self.glyph(x - 1, y), self.glyph(x + 1, y)) {
                (Some('['), Some(']')) => return CellKind::Operator(op, OperatorStyle::Square),
                (Some('{'), Some('}')) => return CellKind::Operator(op, OperatorStyle::Curly),
                _ => {}
            }
        }
        if self.directives.warps.contains(&glyph) {
            return CellKind::Warp(glyph);
        }
        if links.contains(&glyph) {
            return CellKind::LibraryLink(glyph);
        }
        if export == Some(glyph) {
            return CellKind::LibraryExport(glyph);
        }
        match CellKind::from_glyph(glyph) {
            CellKind::Tilde { .. } => CellKind::Tilde {
                inverted: self.glyph(x, y + 1) == Some('!'),
            },
            kind => kind,
        }
    }

    /// Cells covered by quoted print text: from every `$`, in every
    /// direction, optional `_`/`a` flags followed by a quote open a
    /// literal run that ends at the matching quote.
    fn literal_mask(&self) -> Vec<Vec<bool>> {
        let mut mask: Vec<Vec<bool>> = self.rows.iter().map(|r| vec![false; r.len()]).collect();

        for (y, row) in self.rows.iter().enumerate() {
            for (x, &glyph) in row.iter().enumerate() {
                if glyph != '$' || self.masked[y][x] {
                    continue;
                }
                for dir in Direction::ALL {
                    self.mark_literal(x as i32, y as i32, dir, &mut mask);
                }
            }
        }
        mask
    }

    fn mark_literal(&self, x: i32, y: i32, dir: Direction, mask: &mut [Vec<bool>]) {
        let (dx, dy) = dir.delta();
        let (mut cx, mut cy) = (x + dx, y + dy);
        while matches!(self.glyph(cx, cy), Some('_' | 'a')) {
            cx += dx;
            cy += dy;
        }
        let quote = match self.glyph(cx, cy) {
            Some(q @ ('"' | '\'')) => q,
            _ => return,
        };
        loop {
            mask[cy as usize][cx as usize] = true;
            cx += dx;
            cy += dy;
            match self.glyph(cx, cy) {
                Some(g) if g == quote => {
                    mask[cy as usize][cx as usize] = true;
                    return;
                }
                Some(_) => {}
                None => return,
            }
        }
    }
}

fn comment_start(chars: &[char]) -> Option<usize> {
    chars.windows(2).position(|w| w == ['`', '`'])
}

fn parse_directive(
    line: &str,
    line_no: usize,
    scope: &str,
    out: &mut Directives,
    seen: &mut IndexMap<char, &'static str>,
) -> Result<(), LoadError> {
    let malformed = || LoadError::MalformedDirective {
        scope: scope.to_string(),
        line: line_no,
        text: line.to_string(),
    };
    let mut declare = |glyph: char, what: &'static str| {
        if seen.insert(glyph, what).is_some() {
            Err(LoadError::ConflictingDeclaration {
                scope: scope.to_string(),
                glyph,
            })
        } else {
            Ok(())
        }
    };

    let body = &line[1..];
    let mut chars = body.chars();
    match chars.next() {
        Some('$') => {
            let glyphs: Vec<char> = chars.filter(|c| !c.is_whitespace()).collect();
            if glyphs.is_empty() {
                return Err(malformed());
            }
            for glyph in glyphs {
                declare(glyph, "warp")?;
                out.warps.insert(glyph);
            }
        }
        Some('!') => {
            let parts: Vec<&str> = chars.as_str().split_whitespace().collect();
            let [path, glyph] = parts.as_slice() else {
                return Err(malformed());
            };
            let mut glyph_chars = glyph.chars();
            let (Some(glyph), None) = (glyph_chars.next(), glyph_chars.next()) else {
                return Err(malformed());
            };
            declare(glyph, "library")?;
            out.includes.push(Include {
                path: PathBuf::from(path),
                glyph,
            });
        }
        Some('^') => {
            let rest = chars.as_str().trim();
            let mut rest_chars = rest.chars();
            let (Some(glyph), None) = (rest_chars.next(), rest_chars.next()) else {
                return Err(malformed());
            };
            if out.export.is_some() {
                return Err(LoadError::ConflictingDeclaration {
                    scope: scope.to_string(),
                    glyph,
                });
            }
            declare(glyph, "export")?;
            out.export = Some(glyph);
        }
        _ => return Err(malformed()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dots_core::Axis;

    fn parse(text: &str) -> SourceText {
        SourceText::parse(text, "<test>").unwrap()
    }

    #[test]
    fn directives_are_collected_and_masked() {
        let src = parse("%$AB\n%!lib/util.dots f\n.-A\n");
        assert_eq!(
            src.directives.warps.iter().copied().collect::<Vec<_>>(),
            vec!['A', 'B']
        );
        assert_eq!(
            src.directives.includes,
            vec![Include {
                path: PathBuf::from("lib/util.dots"),
                glyph: 'f'
            }]
        );
        let grid = src.classify(None);
        assert_eq!(grid.kind(0, 0), CellKind::Comment);
        assert_eq!(grid.kind(0, 1), CellKind::Comment);
        assert_eq!(grid.kind(2, 2), CellKind::Warp('A'));
    }

    #[test]
    fn comments_mask_to_end_of_line() {
        let grid = parse(".-- `` a comment with . and -").classify(None);
        assert_eq!(grid.kind(2, 0), CellKind::Track(Axis::Horizontal));
        assert_eq!(grid.kind(4, 0), CellKind::Comment);
        assert_eq!(grid.kind(20, 0), CellKind::Comment);
    }

    #[test]
    fn bracketed_glyphs_become_operators() {
        let grid = parse("-[+]-{*}-+-*").classify(None);
        assert_eq!(
            grid.kind(2, 0),
            CellKind::Operator(Operator::Add, OperatorStyle::Square)
        );
        assert_eq!(
            grid.kind(6, 0),
            CellKind::Operator(Operator::Mul, OperatorStyle::Curly)
        );
        assert_eq!(grid.kind(9, 0), CellKind::Crossing);
        assert_eq!(grid.kind(11, 0), CellKind::Duplicator);
    }

    #[test]
    fn mixed_brackets_are_not_operators() {
        let grid = parse("[+}").classify(None);
        assert_eq!(grid.kind(1, 0), CellKind::Crossing);
    }

    #[test]
    fn quoted_text_after_print_is_literal() {
        let grid = parse(".-$_\"a.b-c\"-").classify(None);
        assert_eq!(grid.kind(2, 0), CellKind::Print);
        assert_eq!(grid.kind(4, 0), CellKind::Text);
        assert_eq!(grid.kind(6, 0), CellKind::Text);
        assert_eq!(grid.kind(8, 0), CellKind::Text);
        assert_eq!(grid.kind(10, 0), CellKind::Text);
        assert_eq!(grid.kind(11, 0), CellKind::Track(Axis::Horizontal));
    }

    #[test]
    fn vertical_literal_below_print() {
        let grid = parse("$\n'\n.\n'").classify(None);
        assert_eq!(grid.kind(0, 2), CellKind::Text);
    }

    #[test]
    fn inverted_tilde_needs_bang_below() {
        let grid = parse("~~\n!").classify(None);
        assert_eq!(grid.kind(0, 0), CellKind::Tilde { inverted: true });
        assert_eq!(grid.kind(1, 0), CellKind::Tilde { inverted: false });
    }

    #[test]
    fn export_glyph_only_when_requested() {
        let src = parse("%^X\n-X-");
        assert_eq!(src.directives.export, Some('X'));
        assert_eq!(src.classify(Some('X')).kind(1, 1), CellKind::LibraryExport('X'));
        assert_eq!(src.classify(None).kind(1, 1), CellKind::Text);
    }

    #[test]
    fn declared_glyph_overrides_symbol_table() {
        let grid = parse("%$v\n-v-v").classify(None);
        assert_eq!(grid.kind(1, 1), CellKind::Warp('v'));
    }

    #[test]
    fn malformed_directives_are_rejected() {
        for text in ["%", "%$", "%!onlypath", "%!a.dots ff", "%^", "%^XY", "%?x"] {
            assert!(
                matches!(
                    SourceText::parse(text, "<test>"),
                    Err(LoadError::MalformedDirective { line: 1, .. })
                ),
                "{text} should be malformed"
            );
        }
    }

    #[test]
    fn duplicate_declarations_conflict() {
        assert!(matches!(
            SourceText::parse("%$A\n%!lib.dots A", "<test>"),
            Err(LoadError::ConflictingDeclaration { glyph: 'A', .. })
        ));
        assert!(matches!(
            SourceText::parse("%$AA", "<test>"),
            Err(LoadError::ConflictingDeclaration { glyph: 'A', .. })
        ));
    }
}
