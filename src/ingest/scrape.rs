//! Structural extraction of catalog pages built on `lol_html`.
//!
//! Selectors mirror the storefront's markup: listing pages expose product
//! cards (`.product-card`, `.product-item`, `.grid__item`) whose anchors
//! point at detail pages, and detail pages carry the title, price,
//! description and image in well-known slots. Anything the page does not
//! provide stays `None`; the batch loop decides what is fatal per item.

use crate::error::{ApiError, Result};
use lol_html::{element, text, HtmlRewriter, Settings};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::LazyLock;

static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(₹\s?[\d,]+)").expect("price pattern is valid"));

/// Reduces messy storefront price text to currency symbol plus digits,
/// e.g. "MRP: ₹ 1,299 incl. tax" becomes "₹ 1,299". Text without a price
/// pattern passes through unchanged; empty text becomes "N/A".
pub fn clean_price(price_text: &str) -> String {
    if price_text.trim().is_empty() {
        return "N/A".to_string();
    }
    match PRICE_PATTERN.find(price_text) {
        Some(found) => found.as_str().to_string(),
        None => price_text.to_string(),
    }
}

/// Fields extracted from a product detail page.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub title: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Collects product-page links from the cards of a listing page, resolved
/// against `base_url`, deduplicated in document order and capped at `limit`.
pub fn extract_links(html: &str, base_url: &str, limit: usize) -> Result<Vec<String>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let links: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let seen: Rc<RefCell<HashSet<String>>> = Rc::new(RefCell::new(HashSet::new()));

    let card_anchor_selectors = [
        ".product-card a[href]",
        ".product-item a[href]",
        ".grid__item a[href]",
    ];

    let mut handlers = Vec::new();
    for selector in card_anchor_selectors {
        let links = Rc::clone(&links);
        let seen = Rc::clone(&seen);
        let base_url = base_url.to_string();
        handlers.push(element!(selector, move |el| {
            if links.borrow().len() >= limit {
                return Ok(());
            }
            if let Some(href) = el.get_attribute("href") {
                let resolved = resolve_url(&base_url, href.trim());
                if !resolved.is_empty() && seen.borrow_mut().insert(resolved.clone()) {
                    links.borrow_mut().push(resolved);
                }
            }
            Ok(())
        }));
    }

    run_rewriter(html, handlers)?;

    Ok(Rc::try_unwrap(links)
        .map_err(|_| ApiError::Ingestion("link collector still borrowed".to_string()))?
        .into_inner())
}

#[derive(Default)]
struct DetailDraft {
    h1: String,
    h1_count: usize,
    title_class: String,
    price: String,
    money: String,
    sale_price: String,
    description: String,
    itemprop_description: String,
    image_url: Option<String>,
}

/// Extracts title, price, description and image from a product detail page.
pub fn extract_product(html: &str) -> Result<ProductPage> {
    let draft: Rc<RefCell<DetailDraft>> = Rc::new(RefCell::new(DetailDraft::default()));

    let mut handlers = Vec::new();

    // The page may repeat h1 further down (related items, hidden
    // templates); only the first one is the product title.
    let counter = Rc::clone(&draft);
    handlers.push(element!("h1", move |_el| {
        counter.borrow_mut().h1_count += 1;
        Ok(())
    }));

    let h1 = Rc::clone(&draft);
    handlers.push(text!("h1", move |chunk| {
        let mut draft = h1.borrow_mut();
        if draft.h1_count <= 1 {
            draft.h1.push_str(chunk.as_str());
        }
        Ok(())
    }));

    macro_rules! capture {
        ($selector:expr, $field:ident) => {{
            let draft = Rc::clone(&draft);
            handlers.push(text!($selector, move |chunk| {
                draft.borrow_mut().$field.push_str(chunk.as_str());
                Ok(())
            }));
        }};
    }

    capture!(".product-title", title_class);
    capture!(".price", price);
    capture!(".money", money);
    capture!(".price-item--sale", sale_price);
    capture!(".product-description", description);
    capture!(r#"[itemprop="description"]"#, itemprop_description);

    let image = Rc::clone(&draft);
    handlers.push(element!("img", move |el| {
        let mut draft = image.borrow_mut();
        if draft.image_url.is_none() {
            let src = el
                .get_attribute("src")
                .filter(|s| !s.trim().is_empty())
                .or_else(|| el.get_attribute("data-src"));
            if let Some(src) = src {
                draft.image_url = Some(resolve_image_url(src.trim()));
            }
        }
        Ok(())
    }));

    run_rewriter(html, handlers)?;

    let draft = Rc::try_unwrap(draft)
        .map_err(|_| ApiError::Ingestion("detail collector still borrowed".to_string()))?
        .into_inner();

    Ok(ProductPage {
        title: first_text(&[&draft.h1, &draft.title_class]),
        price: first_text(&[&draft.price, &draft.money, &draft.sale_price]),
        description: first_text(&[&draft.description, &draft.itemprop_description]),
        image_url: draft.image_url,
    })
}

fn run_rewriter(
    html: &str,
    handlers: Vec<(
        std::borrow::Cow<'static, lol_html::Selector>,
        lol_html::ElementContentHandlers<'_>,
    )>,
) -> Result<()> {
    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: handlers,
            ..Settings::default()
        },
        |_: &[u8]| {},
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| ApiError::Ingestion(format!("HTML parse failed: {}", e)))?;
    rewriter
        .end()
        .map_err(|e| ApiError::Ingestion(format!("HTML parse failed: {}", e)))?;
    Ok(())
}

/// First buffer with visible text, whitespace-collapsed.
fn first_text(buffers: &[&String]) -> Option<String> {
    buffers.iter().find_map(|buffer| {
        let collapsed = buffer.split_whitespace().collect::<Vec<_>>().join(" ");
        (!collapsed.is_empty()).then_some(collapsed)
    })
}

fn resolve_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else if href.starts_with('/') {
        format!("{}{}", origin(base_url), href)
    } else {
        href.to_string()
    }
}

fn resolve_image_url(src: &str) -> String {
    if let Some(rest) = src.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        src.to_string()
    }
}

/// `scheme://host[:port]` portion of a URL.
fn origin(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => {
            let host_start = scheme_end + 3;
            match url[host_start..].find('/') {
                Some(path_start) => &url[..host_start + path_start],
                None => url,
            }
        }
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="grid">
            <div class="product-card">
              <h3 class="product-title">Hair Oil</h3>
              <a href="/products/hair-oil">view</a>
            </div>
            <div class="product-item">
              <a href="https://shop.example.com/products/scalp-serum">view</a>
            </div>
            <div class="grid__item">
              <a href="/products/hair-oil">duplicate</a>
              <a href="/products/shampoo">view</a>
            </div>
            <div class="unrelated"><a href="/about">about us</a></div>
          </div>
        </body></html>"#;

    const DETAIL: &str = r#"
        <html><body>
          <h1> Scalp  Serum </h1>
          <span class="price">MRP: ₹ 1,299 incl. tax</span>
          <div class="product-description">
            A lightweight serum
            for daily use.
          </div>
          <img src="//cdn.example.com/serum.jpg">
          <h1>You may also like</h1>
        </body></html>"#;

    #[test]
    fn listing_links_are_resolved_deduplicated_and_capped() {
        let links =
            extract_links(LISTING, "https://shop.example.com/collections/all", 10).unwrap();
        assert_eq!(
            links,
            [
                "https://shop.example.com/products/hair-oil",
                "https://shop.example.com/products/scalp-serum",
                "https://shop.example.com/products/shampoo",
            ]
        );

        let capped =
            extract_links(LISTING, "https://shop.example.com/collections/all", 2).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn anchors_outside_product_cards_are_ignored() {
        let links =
            extract_links(LISTING, "https://shop.example.com/collections/all", 10).unwrap();
        assert!(!links.iter().any(|l| l.ends_with("/about")));
    }

    #[test]
    fn detail_page_extraction() {
        let page = extract_product(DETAIL).unwrap();
        assert_eq!(page.title.as_deref(), Some("Scalp Serum"));
        assert_eq!(page.price.as_deref(), Some("MRP: ₹ 1,299 incl. tax"));
        assert_eq!(
            page.description.as_deref(),
            Some("A lightweight serum for daily use.")
        );
        assert_eq!(
            page.image_url.as_deref(),
            Some("https://cdn.example.com/serum.jpg")
        );
    }

    #[test]
    fn only_the_first_h1_becomes_the_title() {
        let page = extract_product(DETAIL).unwrap();
        assert_eq!(page.title.as_deref(), Some("Scalp Serum"));
    }

    #[test]
    fn missing_fields_stay_none() {
        let page = extract_product("<html><body><p>nothing here</p></body></html>").unwrap();
        assert!(page.title.is_none());
        assert!(page.price.is_none());
        assert!(page.description.is_none());
        assert!(page.image_url.is_none());
    }

    #[test]
    fn price_cleaning_extracts_currency_and_digits() {
        assert_eq!(clean_price("MRP: ₹ 1,299 incl. tax"), "₹ 1,299");
        assert_eq!(clean_price("₹951"), "₹951");
        assert_eq!(clean_price("Sale! ₹ 499 (was ₹ 999)"), "₹ 499");
    }

    #[test]
    fn price_cleaning_falls_back_to_the_raw_text() {
        assert_eq!(clean_price("Contact us for pricing"), "Contact us for pricing");
        assert_eq!(clean_price(""), "N/A");
        assert_eq!(clean_price("   "), "N/A");
    }
}
