//! Species photographs for the top-species cards.
//!
//! A species named `Ipê-Rosa` is shown with `<dir>/ipe-rosa.png` when that
//! file exists. The file is served under [`SPECIES_IMAGES_ROUTE`]; species
//! without a local photograph get a stock image URL instead.

use std::path::Path;

/// URL prefix the server mounts the species directory on.
pub const SPECIES_IMAGES_ROUTE: &str = "/species-images";

/// Stock photograph for any species without a local image.
pub const DEFAULT_FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1502082553048-f009c37129b9?w=400";

/// Stock photographs for specific species, keyed by slug.
const FALLBACK_IMAGES: &[(&str, &str)] = &[(
    "ipe-rosa",
    "https://images.unsplash.com/photo-1602391833977-358a52198938?w=400",
)];

fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// File stem for a species name: lower-cased, accents folded, and every
/// run of other characters collapsed to a single `-`.
///
/// `"Ipê-Rosa"` and `"Ipê-rosa"` both become `"ipe-rosa"`.
#[must_use]
pub fn species_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars().flat_map(char::to_lowercase).map(fold_char) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Stock photograph for `name`.
#[must_use]
pub fn fallback_image(name: &str) -> &'static str {
    let slug = species_slug(name);
    FALLBACK_IMAGES
        .iter()
        .find(|(key, _)| *key == slug)
        .map_or(DEFAULT_FALLBACK_IMAGE, |&(_, url)| url)
}

/// Image URL for `name`, preferring a PNG in `dir` over the stock photo.
#[must_use]
pub fn resolve_species_image(dir: &Path, name: &str) -> String {
    let slug = species_slug(name);
    if !slug.is_empty() && dir.join(format!("{slug}.png")).is_file() {
        return format!("{SPECIES_IMAGES_ROUTE}/{slug}.png");
    }
    log::debug!("No local photograph for species '{name}'");
    fallback_image(name).to_string()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn species_dir(test: &str, files: &[&str]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tree_census_species_{test}_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), b"png").unwrap();
        }
        dir
    }

    #[test]
    fn slugs_fold_accents_and_case() {
        assert_eq!(species_slug("Ipê-Rosa"), "ipe-rosa");
        assert_eq!(species_slug("Ipê-rosa"), "ipe-rosa");
        assert_eq!(species_slug("Mororó"), "mororo");
        assert_eq!(species_slug("Sapoti-do-mangue"), "sapoti-do-mangue");
        assert_eq!(species_slug("  Pau  Brasil "), "pau-brasil");
        assert_eq!(species_slug("***"), "");
    }

    #[test]
    fn local_photograph_wins() {
        let dir = species_dir("local", &["ipe-roxo.png", "mororo.png"]);
        assert_eq!(
            resolve_species_image(&dir, "Ipê-Roxo"),
            "/species-images/ipe-roxo.png"
        );
        assert_eq!(
            resolve_species_image(&dir, "Mororó"),
            "/species-images/mororo.png"
        );
    }

    #[test]
    fn missing_photograph_uses_stock_image() {
        let dir = species_dir("missing", &[]);
        assert_eq!(
            resolve_species_image(&dir, "Ipê-Rosa"),
            "https://images.unsplash.com/photo-1602391833977-358a52198938?w=400"
        );
        assert_eq!(resolve_species_image(&dir, "Oiti"), DEFAULT_FALLBACK_IMAGE);
        assert_eq!(
            resolve_species_image(Path::new("/nonexistent/especies"), "Sabonete"),
            DEFAULT_FALLBACK_IMAGE
        );
    }
}
