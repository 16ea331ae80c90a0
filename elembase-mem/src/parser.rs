//! A lenient markup parser.
//!
//! Like a browser, it never fails:
//! unknown end tags are ignored, unclosed elements are closed at the end of the input,
//! and a `<` that does not start a tag is kept as text.

use html_escape::decode_html_entities;

use crate::dom::{Dom, NodeId, NodeKind};

pub(crate) const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(crate) const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

const ESCAPABLE_RAW_TEXT_ELEMENTS: [&str; 2] = ["textarea", "title"];

#[derive(Debug, PartialEq)]
pub(crate) enum Token {
    StartTag {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag {
        name: String,
    },
    Text(String),
    Comment(String),
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_ascii_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.bump();
        }
        &self.src[start..self.pos]
    }

    fn push_text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        if let Some(Token::Text(prev)) = self.tokens.last_mut() {
            prev.push_str(s);
        } else {
            self.tokens.push(Token::Text(s.to_string()));
        }
    }

    fn run(mut self) -> Vec<Token> {
        while !self.rest().is_empty() {
            let text = self.take_while(|c| c != '<');
            self.push_text(&decode_html_entities(text));
            if self.rest().is_empty() {
                break;
            }
            self.tag_open();
        }
        self.tokens
    }

    fn tag_open(&mut self) {
        let rest = self.rest();
        if let Some(after) = rest.strip_prefix("<!--") {
            // `<!-->` and `<!--->` are empty comments
            let abrupt = if after.starts_with('>') {
                Some(1)
            } else if after.starts_with("->") {
                Some(2)
            } else {
                None
            };
            if let Some(n) = abrupt {
                self.tokens.push(Token::Comment(String::new()));
                self.pos += 4 + n;
                return;
            }
            let (comment, len) = match after.find("-->") {
                Some(end) => (&after[..end], 4 + end + 3),
                None => (after, rest.len()),
            };
            self.tokens.push(Token::Comment(comment.to_string()));
            self.pos += len;
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            // doctype and other bogus comments are dropped
            self.pos += rest.find('>').map(|x| x + 1).unwrap_or(rest.len());
        } else if rest.starts_with("</") {
            match rest[2..].chars().next() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.pos += 2;
                    let name = self.tag_name();
                    self.pos += self.rest().find('>').map(|x| x + 1).unwrap_or(self.rest().len());
                    self.tokens.push(Token::EndTag { name });
                }
                Some('>') => {
                    self.pos += 3;
                }
                _ => {
                    self.pos += 2;
                    self.push_text("</");
                }
            }
        } else {
            match rest[1..].chars().next() {
                Some(c) if c.is_ascii_alphabetic() => {
                    self.pos += 1;
                    self.start_tag();
                }
                _ => {
                    self.pos += 1;
                    self.push_text("<");
                }
            }
        }
    }

    fn tag_name(&mut self) -> String {
        self.take_while(|c| !c.is_ascii_whitespace() && c != '/' && c != '>')
            .to_ascii_lowercase()
    }

    fn start_tag(&mut self) {
        let name = self.tag_name();
        let mut attrs: Vec<(String, String)> = vec![];
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.bump();
                    break;
                }
                Some('/') => {
                    self.bump();
                    if self.peek() == Some('>') {
                        self.bump();
                        self_closing = true;
                        break;
                    }
                }
                Some(_) => {
                    let (attr_name, value) = self.attribute();
                    // the first occurrence wins
                    if !attr_name.is_empty() && !attrs.iter().any(|(n, _)| *n == attr_name) {
                        attrs.push((attr_name, value));
                    }
                }
            }
        }
        let raw = RAW_TEXT_ELEMENTS.contains(&name.as_str());
        let escapable = ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name.as_str());
        self.tokens.push(Token::StartTag {
            name: name.clone(),
            attrs,
            self_closing,
        });
        if (raw || escapable) && !self_closing {
            self.raw_text(&name, escapable);
        }
    }

    fn attribute(&mut self) -> (String, String) {
        let first = self.bump().map(|c| c.to_string()).unwrap_or_default();
        let name = first
            + self.take_while(|c| !c.is_ascii_whitespace() && c != '/' && c != '>' && c != '=');
        self.skip_whitespace();
        if self.peek() != Some('=') {
            return (name.to_ascii_lowercase(), String::new());
        }
        self.bump();
        self.skip_whitespace();
        let value = match self.peek() {
            Some(q) if q == '"' || q == '\'' => {
                self.bump();
                let v = self.take_while(|c| c != q);
                self.bump();
                v
            }
            _ => self.take_while(|c| !c.is_ascii_whitespace() && c != '>'),
        };
        (name.to_ascii_lowercase(), decode_html_entities(value).into_owned())
    }

    fn raw_text(&mut self, name: &str, escapable: bool) {
        let rest = self.rest();
        let lower = rest.to_ascii_lowercase();
        let end_tag = format!("</{}", name);
        let end = lower.find(&end_tag).unwrap_or(rest.len());
        let text = &rest[..end];
        if escapable {
            self.push_text(&decode_html_entities(text));
        } else {
            self.push_text(text);
        }
        self.pos += end;
    }
}

pub(crate) fn tokenize(src: &str) -> Vec<Token> {
    Tokenizer {
        src,
        pos: 0,
        tokens: vec![],
    }
    .run()
}

/// Parse the markup and append the nodes to `parent` .
///
/// Returns the created elements in tree order.
pub(crate) fn parse_into(dom: &mut Dom, parent: NodeId, markup: &str) -> Vec<NodeId> {
    let mut created = vec![];
    let mut stack: Vec<(NodeId, String)> = vec![];
    for token in tokenize(markup) {
        let cur = stack.last().map(|(id, _)| *id).unwrap_or(parent);
        match token {
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                let id = dom.create_element(&name);
                if let Some(elem) = dom.element_mut(id) {
                    elem.attrs = attrs;
                }
                dom.append(cur, id);
                created.push(id);
                if !self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                    stack.push((id, name));
                }
            }
            Token::EndTag { name } => {
                if let Some(index) = stack.iter().rposition(|(_, n)| *n == name) {
                    stack.truncate(index);
                }
            }
            Token::Text(text) => {
                let id = dom.create_node(NodeKind::Text(text));
                dom.append(cur, id);
            }
            Token::Comment(text) => {
                let id = dom.create_node(NodeKind::Comment(text));
                dom.append(cur, id);
            }
        }
    }
    created
}

#[cfg(test)]
mod test {
    use super::*;

    fn start(name: &str, attrs: &[(&str, &str)], self_closing: bool) -> Token {
        Token::StartTag {
            name: name.into(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            self_closing,
        }
    }

    #[test]
    fn tags_and_attributes() {
        assert_eq!(
            tokenize(r#"<DIV as="a" Hidden data-x='1 2' y=3>hi &amp; bye</div>"#),
            vec![
                start(
                    "div",
                    &[("as", "a"), ("hidden", ""), ("data-x", "1 2"), ("y", "3")],
                    false
                ),
                Token::Text("hi & bye".into()),
                Token::EndTag { name: "div".into() },
            ]
        );
    }

    #[test]
    fn duplicated_attributes() {
        assert_eq!(
            tokenize(r#"<a x="1" x="2"/>"#),
            vec![start("a", &[("x", "1")], true)]
        );
    }

    #[test]
    fn comments_and_bogus() {
        assert_eq!(
            tokenize("<!doctype html><!-- c -->a < b</>"),
            vec![Token::Comment(" c ".into()), Token::Text("a < b".into())]
        );
    }

    #[test]
    fn abrupt_comments() {
        assert_eq!(
            tokenize("<!-->a<!--->b"),
            vec![
                Token::Comment("".into()),
                Token::Text("a".into()),
                Token::Comment("".into()),
                Token::Text("b".into()),
            ]
        );
    }

    #[test]
    fn raw_text() {
        assert_eq!(
            tokenize("<style>a > b { }</STYLE><title>&lt;</title>"),
            vec![
                start("style", &[], false),
                Token::Text("a > b { }".into()),
                Token::EndTag {
                    name: "style".into()
                },
                start("title", &[], false),
                Token::Text("<".into()),
                Token::EndTag {
                    name: "title".into()
                },
            ]
        );
    }
}
