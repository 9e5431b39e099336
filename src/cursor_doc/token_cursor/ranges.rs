//! Form ranges: the current form, the enclosing list and the top level form around an
//! offset.

use super::{LispTokenCursor, SexpOptions};
use crate::cursor_doc::token::TokenType;

impl<'a> LispTokenCursor<'a> {
    /// Range of the form at, around or next to `offset`.
    ///
    /// Preference order for the form's end ("anchor"):
    /// 1. the atom containing `offset`
    /// 2. a form ending right at `offset`
    /// 3. a form starting right at `offset`
    /// 4. the previous form, if it ends on the same line
    /// 5. the next form, if it starts on the same line
    /// 6. the previous form
    /// 7. the next form
    /// 8. the enclosing list
    ///
    /// The range then runs back from the anchor over one form, metadata included.
    pub fn range_for_current_form(&self, offset: usize) -> Option<(usize, usize)> {
        let doc = self.doc();
        let anchor = self.current_form_anchor(offset)?;
        let mut cursor = doc.get_token_cursor(anchor, false);
        let end = cursor.offset_start();
        let options = SexpOptions::default().with_metadata();
        if cursor.backward_sexp_with(options) {
            Some((cursor.offset_start(), end))
        } else {
            None
        }
    }

    fn current_form_anchor(&self, offset: usize) -> Option<usize> {
        let doc = self.doc();
        let cursor = doc.get_token_cursor(offset, false);
        let token = cursor.get_token();
        let (row, _) = doc.get_row_col(offset);
        let metadata = SexpOptions::default().with_metadata();

        if matches!(
            token.kind,
            TokenType::Id | TokenType::Kw | TokenType::Lit | TokenType::StrInside
        ) && offset < cursor.offset_end()
        {
            if cursor.token_begins_metadata() {
                let mut form = cursor;
                if form.forward_sexp_with(metadata) {
                    return Some(form.offset_start());
                }
            }
            return Some(cursor.offset_end());
        }

        let at_boundary = cursor.offset_start() == offset;
        if at_boundary {
            let prev = cursor.get_prev_token();
            if !prev.kind.is_whitespace() && prev.kind != TokenType::Comment {
                let mut back = cursor;
                if back.backward_sexp() {
                    return Some(offset);
                }
            }
            if !token.kind.is_whitespace() && token.kind != TokenType::Comment {
                let mut form = cursor;
                if form.forward_sexp_with(metadata) {
                    let mut back = form;
                    if back.backward_sexp_with(metadata) && back.offset_start() == offset {
                        return Some(form.offset_start());
                    }
                }
            }
        }

        let mut before = cursor;
        before.backward_whitespace(true);
        let mut previous_form = before;
        let has_previous = previous_form.backward_sexp();

        let mut after = cursor;
        after.forward_whitespace(true);
        let mut next_form = after;
        let has_next = next_form.forward_sexp_with(metadata);

        if has_previous && before.row_col().0 == row {
            return Some(before.offset_start());
        }
        if has_next && after.row_col().0 == row {
            return Some(next_form.offset_start());
        }
        if has_previous {
            return Some(before.offset_start());
        }
        if has_next {
            return Some(next_form.offset_start());
        }

        let mut list = cursor;
        if list.backward_list() && list.backward_up_list() && list.forward_sexp() {
            return Some(list.offset_start());
        }
        None
    }

    /// Range of the top level form around `offset`.
    ///
    /// With `comment_creates_top_level`, the forms directly inside a `(comment ...)` form
    /// count as top level.
    pub fn range_for_defun(&self, offset: usize, comment_creates_top_level: bool) -> (usize, usize) {
        let doc = self.doc();
        let mut cursor = doc.get_token_cursor(offset, false);
        let mut candidate = cursor.range_for_current_form(offset);
        while cursor.forward_list() && cursor.up_list() {
            let mut closing = cursor;
            closing.backward_down_list();
            let in_comment_form =
                closing.get_token().raw == ")" && closing.function_name() == Some("comment");
            if comment_creates_top_level && in_comment_form {
                break;
            }
            candidate = cursor.range_for_current_form(cursor.offset_start());
        }
        candidate.unwrap_or((offset, offset))
    }

    /// Range of the list `depth` levels up from the cursor.
    pub fn range_for_list(&self, depth: usize) -> Option<(usize, usize)> {
        let mut cursor = *self;
        for _ in 0..depth {
            if !(cursor.forward_list() && cursor.up_list()) {
                return None;
            }
        }
        let end = cursor.offset_start();
        if cursor.backward_sexp() {
            Some((cursor.offset_start(), end))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cursor_doc::model::LineInputModel;
    use rstest::rstest;

    fn current_form(text: &str, offset: usize) -> Option<String> {
        let model = LineInputModel::new(text);
        let cursor = model.get_token_cursor(offset, false);
        cursor
            .range_for_current_form(offset)
            .map(|(start, end)| model.get_text(start, end, false))
    }

    #[rstest(
        text,
        offset,
        expected,
        case("(a bcd e)", 4, "bcd"),
        case("(a bcd e)", 3, "bcd"),
        case("(a (b c) d)", 8, "(b c)"),
        case("(a (b c) d)", 3, "(b c)"),
        case("(a  b)", 3, "a"),
        case("(a\n  b)", 5, "b"),
        case("(a\n\n  b)", 3, "a"),
        case("(a ^:m b)", 3, "^:m b"),
        case("(a #inst \"x\" b)", 3, "#inst \"x\""),
        case("()", 1, "()"),
        case("(f \"ab cd\")", 5, "ab")
    )]
    fn test_range_for_current_form(text: &str, offset: usize, expected: &str) {
        assert_eq!(current_form(text, offset).as_deref(), Some(expected));
    }

    #[test]
    fn test_range_for_current_form_empty_document() {
        assert_eq!(current_form("", 0), None);
    }

    fn defun(text: &str, offset: usize, comment_creates_top_level: bool) -> String {
        let model = LineInputModel::new(text);
        let cursor = model.get_token_cursor(offset, false);
        let (start, end) = cursor.range_for_defun(offset, comment_creates_top_level);
        model.get_text(start, end, false)
    }

    #[test]
    fn test_range_for_defun() {
        let text = "(ns x)\n(defn f [a]\n  (inc a))";
        assert_eq!(defun(text, 22, true), "(defn f [a]\n  (inc a))");
        assert_eq!(defun(text, 2, true), "(ns x)");
    }

    #[test]
    fn test_range_for_defun_in_comment_form() {
        let text = "(comment\n  (foo (bar 1))\n  :kw)";
        assert_eq!(defun(text, 18, true), "(foo (bar 1))");
        assert_eq!(defun(text, 18, false), text);
    }

    #[test]
    fn test_range_for_list() {
        let model = LineInputModel::new("(a [b c] d)");
        let cursor = model.get_token_cursor(5, false);
        assert_eq!(cursor.range_for_list(1), Some((3, 8)));
        assert_eq!(cursor.range_for_list(2), Some((0, 11)));
        assert_eq!(cursor.range_for_list(3), None);
    }
}
