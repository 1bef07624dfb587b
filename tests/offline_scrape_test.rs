//! End-to-end offline scrapes against local HTML fixtures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use image::{ImageBuffer, Rgb};

use garimpo::fetch::Engine;
use garimpo::scrape::{scrape_product, ScrapeOptions};
use garimpo::GarimpoError;

fn options(out: &Path) -> ScrapeOptions {
    ScrapeOptions {
        output_dir: out.to_path_buf(),
        title_case_names: true,
        engine: Engine::Http,
        min_image_bytes: 0,
        ffmpeg_timeout: Duration::from_secs(30),
        skip_media: false,
        verbose: false,
    }
}

const ALIEXPRESS_PAGE: &str = r#"<html><head></head><body>
<h1 data-pl="product-title">wireless mouse</h1>
<div class="price-default--currentWrap--A_MNgCG">R$ 80,00</div>
<span class="price-default--original--CWcHOit">R$ 100,00</span>
<div id="product-description">A RELIABLE wireless mouse. GREAT battery!</div>
</body></html>"#;

#[test]
fn aliexpress_offline_scrape_extracts_all_fields() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("out");
    let page = work.path().join("page.html");
    fs::write(&page, ALIEXPRESS_PAGE).unwrap();

    let record = scrape_product(
        "https://pt.aliexpress.com/item/1005123.html",
        Some(&page),
        &options(&out),
    )
    .unwrap();

    assert_eq!(record.platform, "AliExpress");
    assert_eq!(record.name, "Wireless_Mouse");
    assert_eq!(record.current_price.display(), "80,00");
    assert_eq!(record.old_price.display(), "100,00");
    assert_eq!(record.discount, "20%");
    assert_eq!(
        record.description,
        "A reliable wireless mouse. Great battery!"
    );
    assert!(!record.international);

    let product_dir = out.join("AliExpress - Wireless_Mouse");
    assert!(product_dir.is_dir());
    let description = product_dir.join("Wireless_Mouse_description.txt");
    assert!(description.is_file());
    let content = fs::read_to_string(description).unwrap();
    assert!(content.contains("Price: From R$80,00 to R$100,00 (20%)"));
    assert!(content.contains("🛒 Encontre no AliExpress:"));
    // Offline runs never write a snapshot.
    assert!(!product_dir.join("page.html").exists());
}

#[test]
fn shein_offline_scrape_copies_images_and_reduces_duplicates() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("out");
    let images = work.path().join("images");
    fs::create_dir_all(&images).unwrap();
    // Same flat artwork at two resolutions: duplicates after
    // normalization, higher-resolution copy must survive.
    ImageBuffer::from_pixel(60, 60, Rgb([180u8, 20, 20]))
        .save(images.join("a.png"))
        .unwrap();
    ImageBuffer::from_pixel(120, 120, Rgb([180u8, 20, 20]))
        .save(images.join("b.png"))
        .unwrap();

    let page = work.path().join("page.html");
    fs::write(
        &page,
        r#"<html><body>
<span class="fsp-element">vestido longo</span>
<div id="productMainPriceId">R$ 79,90</div>
<ul class="thumbs-picture">
<li class="thumbs-picture__column"><img src="./images/a.png"/></li>
<li class="thumbs-picture__column"><img src="./images/b.png"/></li>
</ul>
</body></html>"#,
    )
    .unwrap();

    let record = scrape_product(
        "https://br.shein.com/dress-p-123.html",
        Some(&page),
        &options(&out),
    )
    .unwrap();

    assert_eq!(record.name, "Vestido_Longo");
    assert_eq!(record.current_price.display(), "79,90");
    assert_eq!(record.old_price.display(), "N/A");
    assert_eq!(record.discount, "N/A");
    assert_eq!(record.image_urls.len(), 2);

    let product_dir = out.join("Shein - Vestido_Longo");
    let surviving: Vec<_> = fs::read_dir(&product_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.ends_with(".png"))
        .collect();
    assert_eq!(surviving, vec!["image_02.png".to_string()]);
    // The record only lists files that survived reduction.
    assert!(record
        .downloaded_files
        .iter()
        .all(|path| path.exists()));
}

#[test]
fn unknown_product_writes_no_description_file() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("out");
    let page = work.path().join("page.html");
    fs::write(&page, "<html><body><p>nada aqui</p></body></html>").unwrap();

    let record = scrape_product(
        "https://shopee.com.br/produto/1/2",
        Some(&page),
        &options(&out),
    )
    .unwrap();

    assert_eq!(record.name, "Unknown Product");
    let product_dir = out.join("Shopee - Unknown Product");
    assert!(product_dir.is_dir());
    let any_txt = fs::read_dir(&product_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .any(|e| e.file_name().to_string_lossy().ends_with(".txt"));
    assert!(!any_txt);
}

#[test]
fn unsupported_store_is_rejected() {
    let work = tempfile::tempdir().unwrap();
    let err = scrape_product("https://example.com/p/1", None, &options(work.path())).unwrap_err();
    assert!(matches!(err, GarimpoError::UnsupportedPlatform(_)));
}

#[test]
fn skip_media_writes_nothing() {
    let work = tempfile::tempdir().unwrap();
    let out = work.path().join("out");
    let page = work.path().join("page.html");
    fs::write(&page, ALIEXPRESS_PAGE).unwrap();

    let mut opts = options(&out);
    opts.skip_media = true;
    let record = scrape_product(
        "https://pt.aliexpress.com/item/1005123.html",
        Some(&page),
        &opts,
    )
    .unwrap();

    assert_eq!(record.name, "Wireless_Mouse");
    assert!(record.downloaded_files.is_empty());
    assert!(!out.exists());
}
