//! Contact information widget (cover).

use std::sync::LazyLock;

use folio_markup::{Element, Selector};

use crate::branding::Branding;
use crate::traits::PageWidget;

/// Branding identifier that personalizes the contact fields.
const PERSONAL_BRAND: &str = "screamingbox";

const PERSONAL_EMAIL: &str = "andras.sevcsik@screamingbox.com";
const PERSONAL_SITE: &str = "screamingbox.com";

static EMAIL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".contact-info .email").expect("Invalid email selector"));

static SITE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".contact-info .site").expect("Invalid site selector"));

/// The contact widget.
///
/// Reflects the branding identifier as a `branding-<id>` class on its root
/// and, for the site owner's personal brand, rewrites the optional email and
/// site fields with their canonical values.
#[derive(Debug, Clone)]
pub struct ContactWidget {
    branding: Branding,
}

impl ContactWidget {
    /// Create a contact widget with the given branding.
    pub fn new(branding: Branding) -> Self {
        Self { branding }
    }
}

impl PageWidget for ContactWidget {
    fn tag_name(&self) -> &'static str {
        "cv-contact"
    }

    fn mount(&self, root: &mut Element) {
        if let Some(id) = self.branding.get() {
            root.add_class(&format!("branding-{}", id));
        }

        if self.branding.get() != Some(PERSONAL_BRAND) {
            return;
        }

        // The link target always mirrors the display text.
        if let Some(email) = root.find_mut(&EMAIL_SELECTOR) {
            email.set_text(PERSONAL_EMAIL);
            let href = format!("mailto:{}", email.text());
            email.set_attr("href", href);
        }

        if let Some(site) = root.find_mut(&SITE_SELECTOR) {
            site.set_text(PERSONAL_SITE);
            let href = format!("http://{}", site.text());
            site.set_attr("href", href);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_markup::parse;
    use pretty_assertions::assert_eq;

    fn mount_on(markup: &str, branding: Branding) -> Element {
        let doc = parse(markup).unwrap();
        let folio_markup::Node::Element(mut root) = doc.nodes.into_iter().next().unwrap() else {
            panic!("expected an element root");
        };

        ContactWidget::new(branding).mount(&mut root);
        root
    }

    const FULL_MARKUP: &str = "<cv-contact>\
                                 <div class=\"contact-info\">\
                                   <a class=\"email\" href=\"mailto:x@y\">x@y</a>\
                                   <a class=\"site\" href=\"http://old\">old</a>\
                                 </div>\
                               </cv-contact>";

    #[test]
    fn personal_brand_rewrites_both_fields() {
        let root = mount_on(FULL_MARKUP, Branding::from("screamingbox"));

        let email = root.find(&EMAIL_SELECTOR).unwrap();
        assert_eq!(email.text(), "andras.sevcsik@screamingbox.com");
        assert_eq!(
            email.attr("href"),
            Some("mailto:andras.sevcsik@screamingbox.com")
        );

        let site = root.find(&SITE_SELECTOR).unwrap();
        assert_eq!(site.text(), "screamingbox.com");
        assert_eq!(site.attr("href"), Some("http://screamingbox.com"));

        assert!(root.has_class("branding-screamingbox"));
    }

    #[test]
    fn other_brand_only_adds_class() {
        let root = mount_on(FULL_MARKUP, Branding::from("acme"));

        assert!(root.has_class("branding-acme"));

        let email = root.find(&EMAIL_SELECTOR).unwrap();
        assert_eq!(email.text(), "x@y");
        assert_eq!(email.attr("href"), Some("mailto:x@y"));

        let site = root.find(&SITE_SELECTOR).unwrap();
        assert_eq!(site.text(), "old");
        assert_eq!(site.attr("href"), Some("http://old"));
    }

    #[test]
    fn absent_branding_is_a_no_op() {
        let root = mount_on(FULL_MARKUP, Branding::none());

        assert_eq!(root.attr("class"), None);
        assert_eq!(root.find(&EMAIL_SELECTOR).unwrap().text(), "x@y");
    }

    #[test]
    fn empty_branding_is_a_no_op() {
        let root = mount_on(FULL_MARKUP, Branding::new(Some(String::new())));

        assert_eq!(root.attr("class"), None);
        assert_eq!(root.find(&SITE_SELECTOR).unwrap().text(), "old");
    }

    #[test]
    fn missing_site_field_still_processes_email() {
        let markup = "<cv-contact>\
                        <div class=\"contact-info\">\
                          <a class=\"email\" href=\"mailto:x@y\">x@y</a>\
                        </div>\
                      </cv-contact>";

        let root = mount_on(markup, Branding::from("screamingbox"));

        let email = root.find(&EMAIL_SELECTOR).unwrap();
        assert_eq!(email.text(), "andras.sevcsik@screamingbox.com");
        assert!(root.find(&SITE_SELECTOR).is_none());
    }

    #[test]
    fn missing_email_field_still_processes_site() {
        let markup = "<cv-contact>\
                        <div class=\"contact-info\">\
                          <a class=\"site\">old</a>\
                        </div>\
                      </cv-contact>";

        let root = mount_on(markup, Branding::from("screamingbox"));

        let site = root.find(&SITE_SELECTOR).unwrap();
        assert_eq!(site.text(), "screamingbox.com");
        assert_eq!(site.attr("href"), Some("http://screamingbox.com"));
    }

    #[test]
    fn missing_contact_info_entirely_is_fine() {
        let root = mount_on("<cv-contact></cv-contact>", Branding::from("screamingbox"));

        assert!(root.has_class("branding-screamingbox"));
        assert!(root.find(&EMAIL_SELECTOR).is_none());
    }
}
