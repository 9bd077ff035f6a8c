//! Named placeholder (`:name`) to positional (`$n`) rewriting.
//!
//! Postgres only understands positional parameters, while the builder binds
//! values by name. The scanner walks the statement once and leaves quoted
//! text, comments and `::type` casts untouched.

use crate::error::{SelectError, SelectResult};
use crate::param::Params;
use crate::value::Value;

/// A statement rewritten to `$n` placeholders together with the ordered values.
#[derive(Debug)]
pub struct Positional<'a> {
    pub sql: String,
    pub names: Vec<String>,
    pub values: Vec<&'a Value>,
}

impl Positional<'_> {
    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn tokio_postgres::types::ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| *v as &(dyn tokio_postgres::types::ToSql + Sync))
            .collect()
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

/// Copy a quoted section starting at `start` (which holds `quote`) and return the index after it.
fn skip_quoted(chars: &[char], start: usize, quote: char, out: &mut String) -> usize {
    let mut i = start;
    out.push(chars[i]);
    i += 1;
    while i < chars.len() {
        out.push(chars[i]);
        if chars[i] == quote {
            // doubled quote is an escaped quote
            if chars.get(i + 1) == Some(&quote) {
                out.push(quote);
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    i
}

/// Try to read a dollar-quote tag (`$$` or `$tag$`) at `start`.
fn dollar_tag(chars: &[char], start: usize) -> Option<String> {
    let mut i = start + 1;
    while i < chars.len() && is_ident_char(chars[i]) {
        i += 1;
    }
    if chars.get(i) == Some(&'$') {
        let tag: String = chars[start..=i].iter().collect();
        if tag.len() == 2 || tag.chars().nth(1).is_some_and(|c| !c.is_ascii_digit()) {
            return Some(tag);
        }
    }
    None
}

/// Rewrite `:name` placeholders in `sql` into `$1, $2, ...`.
///
/// A name used several times is bound once and reuses its index. Every
/// referenced name must be present in `params`; values that are never
/// referenced are not returned.
pub fn to_positional<'a>(sql: &str, params: &'a Params) -> SelectResult<Positional<'a>> {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut names: Vec<String> = Vec::new();
    let mut values: Vec<&'a Value> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\'' | '"' => {
                i = skip_quoted(&chars, i, c, &mut out);
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    out.push(chars[i]);
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                out.push_str("/*");
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        out.push_str("*/");
                        i += 2;
                        break;
                    }
                    out.push(chars[i]);
                    i += 1;
                }
            }
            '$' => match dollar_tag(&chars, i) {
                Some(tag) => {
                    out.push_str(&tag);
                    i += tag.chars().count();
                    let rest: String = chars[i..].iter().collect();
                    match rest.find(&tag) {
                        Some(pos) => {
                            out.push_str(&rest[..pos + tag.len()]);
                            i += rest[..pos + tag.len()].chars().count();
                        }
                        None => {
                            out.push_str(&rest);
                            i = chars.len();
                        }
                    }
                }
                None => {
                    out.push('$');
                    i += 1;
                }
            },
            ':' if chars.get(i + 1) == Some(&':') => {
                out.push_str("::");
                i += 2;
            }
            ':' if chars.get(i + 1).copied().is_some_and(is_ident_start) => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                let idx = match names.iter().position(|n| *n == name) {
                    Some(pos) => pos + 1,
                    None => {
                        let value = params
                            .get(&name)
                            .ok_or_else(|| SelectError::UnboundParam(name.clone()))?;
                        names.push(name);
                        values.push(value);
                        names.len()
                    }
                };
                out.push('$');
                out.push_str(&idx.to_string());
                i = end;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Ok(Positional {
        sql: out,
        names,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, i64)]) -> Params {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_simple_rewrite() {
        let p = params(&[("age", 18)]);
        let out = to_positional("SELECT id FROM users u WHERE u.age > :age", &p).unwrap();
        assert_eq!(out.sql, "SELECT id FROM users u WHERE u.age > $1");
        assert_eq!(out.values, vec![&Value::Int(18)]);
    }

    #[test]
    fn test_reused_name_shares_index() {
        let p = params(&[("lo", 1), ("hi", 9)]);
        let out = to_positional("WHERE a > :lo AND b < :hi AND c > :lo", &p).unwrap();
        assert_eq!(out.sql, "WHERE a > $1 AND b < $2 AND c > $1");
        assert_eq!(out.names, vec!["lo".to_string(), "hi".to_string()]);
        assert_eq!(out.values.len(), 2);
    }

    #[test]
    fn test_cast_is_not_a_placeholder() {
        let p = params(&[("id", 3)]);
        let out = to_positional("WHERE id::text = :id::text", &p).unwrap();
        assert_eq!(out.sql, "WHERE id::text = $1::text");
    }

    #[test]
    fn test_quoted_text_and_comments_untouched() {
        let p = params(&[("x", 1)]);
        let sql = "SELECT ':skip', \"col:name\" -- :nope\nFROM t /* :also */ WHERE a = :x";
        let out = to_positional(sql, &p).unwrap();
        assert_eq!(
            out.sql,
            "SELECT ':skip', \"col:name\" -- :nope\nFROM t /* :also */ WHERE a = $1"
        );
        assert_eq!(out.values.len(), 1);
    }

    #[test]
    fn test_escaped_quote_inside_literal() {
        let p = params(&[("x", 1)]);
        let out = to_positional("WHERE a = 'it''s :x' AND b = :x", &p).unwrap();
        assert_eq!(out.sql, "WHERE a = 'it''s :x' AND b = $1");
    }

    #[test]
    fn test_dollar_quoted_body_untouched() {
        let p = params(&[("x", 1)]);
        let out = to_positional("SELECT $tag$ :x $tag$, :x", &p).unwrap();
        assert_eq!(out.sql, "SELECT $tag$ :x $tag$, $1");
    }

    #[test]
    fn test_unbound_name_errors() {
        let p = Params::new();
        let err = to_positional("WHERE a = :missing", &p).unwrap_err();
        assert!(matches!(err, SelectError::UnboundParam(ref n) if n == "missing"));
    }

    #[test]
    fn test_unreferenced_values_dropped() {
        let p = params(&[("used", 1), ("extra", 2)]);
        let out = to_positional("WHERE a = :used", &p).unwrap();
        assert_eq!(out.values, vec![&Value::Int(1)]);
    }

    #[test]
    fn test_no_placeholders() {
        let p = Params::new();
        let out = to_positional("SELECT * FROM t", &p).unwrap();
        assert_eq!(out.sql, "SELECT * FROM t");
        assert!(out.params_ref().is_empty());
    }
}
