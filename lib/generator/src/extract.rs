use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOCUMENT: Regex =
        Regex::new(r"(?is)<!DOCTYPE html>.*?</html>").expect("valid document regex");
    static ref HTML_ELEMENT: Regex =
        Regex::new(r"(?is)<html.*?>.*?</html>").expect("valid html element regex");
    static ref BODY_ELEMENT: Regex =
        Regex::new(r"(?is)<body.*?>.*?</body>").expect("valid body element regex");
}

/// Pulls the HTML document out of a model reply.
///
/// Replies often wrap the markup in prose or code fences. The first match wins:
/// a full document starting at the doctype, an `<html>` element which gets a doctype prepended,
/// or a `<body>` element which is wrapped in a minimal document. Anything else is returned as is.
pub fn extract_html(text: &str) -> String {
    if let Some(m) = DOCUMENT.find(text) {
        return m.as_str().to_string();
    }

    if let Some(m) = HTML_ELEMENT.find(text) {
        return format!("<!DOCTYPE html>\n{}", m.as_str());
    }

    if let Some(m) = BODY_ELEMENT.find(text) {
        return format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset='UTF-8'>\n<title>Generated Page</title>\n</head>\n{}\n</html>",
            m.as_str()
        );
    }

    text.to_string()
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn document_with_surrounding_prose() {
        let reply = "Sure! Here it is:\n```html\n<!DOCTYPE html><html><body>hi</body></html>\n```\nEnjoy.";
        assert_eq!(
            "<!DOCTYPE html><html><body>hi</body></html>",
            extract_html(reply)
        );
    }

    #[test]
    fn doctype_match_is_case_insensitive_and_shortest() {
        let reply = "<!doctype HTML>\n<html>one</HTML> trailing <html>two</html>";
        assert_eq!("<!doctype HTML>\n<html>one</HTML>", extract_html(reply));
    }

    #[test]
    fn html_element_gets_doctype() {
        let reply = "text <html lang=\"en\">\n<body>x</body>\n</html> more";
        assert_eq!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<body>x</body>\n</html>",
            extract_html(reply)
        );
    }

    #[test]
    fn body_element_gets_scaffold() {
        insta::assert_snapshot!(extract_html("here: <body class=\"a\"><h1>Hi</h1></body> done"), @r###"
        <!DOCTYPE html>
        <html>
        <head>
        <meta charset='UTF-8'>
        <title>Generated Page</title>
        </head>
        <body class="a"><h1>Hi</h1></body>
        </html>
        "###);
    }

    #[test_case("" ; "empty")]
    #[test_case("no markup at all" ; "plain text")]
    #[test_case("<div>fragment</div>" ; "fragment")]
    fn unmatched_text_is_returned_unchanged(reply: &str) {
        assert_eq!(reply, extract_html(reply));
    }
}
