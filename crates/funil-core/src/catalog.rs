//! Product catalog: keyword lookup for the products the bot sells.

use serde::{Deserialize, Serialize};
use tracing::info;

/// A product the bot can recommend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductEntry {
    /// Lower-case product name, matched as a substring of inbound text.
    pub keyword: String,
    pub description: String,
    /// Checkout or landing page.
    pub link: String,
    /// Shorter names customers use for the product, matched like `keyword`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Environment variable whose value, when set, replaces `link`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_env: Option<String>,
}

impl ProductEntry {
    fn new(keyword: &str, description: &str, link: &str, checkout_env: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            description: description.to_string(),
            link: link.to_string(),
            aliases: Vec::new(),
            checkout_env: Some(checkout_env.to_string()),
        }
    }

    fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Whether the lower-cased `text` mentions the keyword or an alias.
    fn mentioned_in(&self, text: &str) -> bool {
        text.contains(&self.keyword) || self.aliases.iter().any(|a| text.contains(a.as_str()))
    }

    /// Canned product card sent when a message mentions this product.
    pub fn card(&self) -> String {
        format!(
            "\u{1f4e6} *{}*\n{}\n\u{1f517} Link: {}",
            self.keyword.to_uppercase(),
            self.description,
            self.link
        )
    }
}

/// Immutable product catalog, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<ProductEntry>,
}

impl Catalog {
    pub fn new(products: Vec<ProductEntry>) -> Self {
        let products = products
            .into_iter()
            .map(|mut p| {
                p.keyword = p.keyword.trim().to_lowercase();
                p.aliases = p
                    .aliases
                    .iter()
                    .map(|a| a.trim().to_lowercase())
                    .filter(|a| !a.is_empty())
                    .collect();
                p
            })
            .filter(|p| !p.keyword.is_empty())
            .collect();
        Self { products }
    }

    /// Catalog from config, falling back to the built-in products when the
    /// config lists none. Checkout links are then overridden from the
    /// environment.
    pub fn load(configured: &[ProductEntry]) -> Self {
        let products = if configured.is_empty() {
            builtin_products()
        } else {
            configured.to_vec()
        };
        let mut catalog = Self::new(products);
        catalog.apply_checkout_overrides(|key| std::env::var(key).ok());
        catalog
    }

    /// Replace links whose `checkout_env` variable resolves to a non-empty value.
    pub fn apply_checkout_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for product in &mut self.products {
            let Some(key) = product.checkout_env.as_deref() else {
                continue;
            };
            if let Some(link) = lookup(key).filter(|v| !v.trim().is_empty()) {
                info!("catalog: checkout link for '{}' taken from {key}", product.keyword);
                product.link = link.trim().to_string();
            }
        }
    }

    /// First product whose keyword or alias occurs in `text` (case-insensitive).
    pub fn find(&self, text: &str) -> Option<&ProductEntry> {
        let lower = text.to_lowercase();
        self.products.iter().find(|p| p.mentioned_in(&lower))
    }

    /// Look up a product by its exact keyword.
    pub fn get(&self, keyword: &str) -> Option<&ProductEntry> {
        let lower = keyword.trim().to_lowercase();
        self.products.iter().find(|p| p.keyword == lower)
    }

    pub fn products(&self) -> &[ProductEntry] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// The default product line.
pub fn builtin_products() -> Vec<ProductEntry> {
    vec![
        ProductEntry::new(
            "cérebro em alta performance",
            "Um e-book onde ajudará a melhorar a sua questão neuronal do cérebro e melhorar cada dia a mais para ter uma vida saudável.",
            "https://renovacaocosmica.shop/23/crb-fnl",
            "CHECKOUT_CEREBRO_ALTA_PERFORMANCE",
        ),
        ProductEntry::new(
            "corpo e mente",
            "Recupere o equilíbrio físico e emocional com um método natural e eficaz.",
            "https://renovacaocosmica.shop/23/crpint-fnl",
            "CHECKOUT_CORPO_MENTE",
        ),
        ProductEntry::new(
            "saúde imersiva",
            "O futuro em suas mãos: cuide-se com dispositivos vestíveis e realidade aumentada. Experimente a revolução da saúde.",
            "https://renovacaocosmica.shop/23/fnl-imersiva",
            "CHECKOUT_SAUDE_IMERSIVA",
        ),
        ProductEntry::new(
            "saúde do amanhã",
            "Tecnologia de saúde inovadora para cuidar de você. Cuide da sua saúde com tecnologias avançadas.",
            "https://renovacaocosmica.shop/23/fnl-saude",
            "CHECKOUT_SAUDE_AMANHA",
        ),
        ProductEntry::new(
            "sono profundo, vida renovada",
            "Recupere-se enquanto dorme com sono profundo. Pare de se preocupar com noites mal dormidas.",
            "https://renovacaocosmica.shop/23/sono-fnl",
            "CHECKOUT_SONO_PROFUNDO",
        )
        .with_aliases(&["sono profundo"]),
        ProductEntry::new(
            "rosa xantina",
            "Você merece ter uma pele radiante e saudável todos os dias! Com uma fórmula poderosa e inovadora, o Rosa Xantina é o segredo para uma pele deslumbrante.",
            "https://ev.braip.com/ref?pv=pro9y44w&af=afijp7y0qm",
            "CHECKOUT_ROSA_XANTINA",
        ),
        ProductEntry::new(
            "os alongamentos essenciais",
            "Melhore sua flexibilidade e alivie as tensões com 15 minutos diários! Alongamentos simples para fazer em casa e aliviar as tensões.",
            "https://renovacaocosmica.shop/23/alg-fnl",
            "CHECKOUT_15_ALONGAMENTOS",
        )
        .with_aliases(&["15 alongamentos"]),
        ProductEntry::new(
            "renavidiol cba",
            "Descubra o poder do Canabinoid Active System™. A tecnologia que restaura a beleza da sua pele logo nas primeiras aplicações!",
            "https://ev.braip.com/ref?pv=pro173dg&af=afimex7zn1",
            "CHECKOUT_RENAVIDIOL_CBA",
        ),
        ProductEntry::new(
            "nervocure",
            "Conquiste uma vida sem dores de forma 100% segura e comprovada. Auxílio na diminuição das dores, queimação, formigamentos, agulhadas, choques e dormência.",
            "https://renovacaocosmica.shop/23/nervocuretic",
            "CHECKOUT_NERVOCURE",
        ),
        ProductEntry::new(
            "100queda",
            "Trinoxidil Americano! O único tratamento do mundo capaz de restaurar até 2.000 fios de cabelo por semana!",
            "https://ev.braip.com/ref?pv=pro4rxm7&af=afivpggv51",
            "CHECKOUT_100QUEDA",
        ),
        ProductEntry::new(
            "dor sob controle",
            "Um método natural para aliviar dores crônicas e voltar a se movimentar com liberdade no dia a dia.",
            "https://renovacaocosmica.shop/23/fnl-inicial",
            "CHECKOUT_DOR_CONTROLE",
        ),
        ProductEntry::new(
            "hemogotas",
            "O único tratamento natural que age de dentro para fora com tecnologia americana avançada. Alívio rápido e duradouro para hemorroidas.",
            "https://ev.braip.com/ref?pv=pror2eex&af=afilxjyn16",
            "CHECKOUT_HEMOGOTAS",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::new(builtin_products())
    }

    #[test]
    fn test_builtin_catalog_has_all_products() {
        assert_eq!(catalog().len(), 12);
    }

    #[test]
    fn test_find_is_case_insensitive_substring() {
        let c = catalog();
        let p = c.find("Quero saber sobre HEMOGOTAS por favor").unwrap();
        assert_eq!(p.keyword, "hemogotas");

        let p = c.find("tem o Cérebro em Alta Performance?").unwrap();
        assert_eq!(p.keyword, "cérebro em alta performance");

        assert!(c.find("qual o preço do frete?").is_none());
    }

    #[test]
    fn test_card_contains_description_and_link() {
        let c = catalog();
        let p = c.get("hemogotas").unwrap();
        let card = p.card();
        assert!(card.contains("*HEMOGOTAS*"));
        assert!(card.contains(&p.description));
        assert!(card.contains("https://ev.braip.com/ref?pv=pror2eex&af=afilxjyn16"));
    }

    #[test]
    fn test_checkout_override_replaces_link() {
        let mut c = catalog();
        c.apply_checkout_overrides(|key| {
            (key == "CHECKOUT_HEMOGOTAS").then(|| "https://pay.example/hemo".to_string())
        });
        assert_eq!(c.get("hemogotas").unwrap().link, "https://pay.example/hemo");
        // Untouched products keep their default.
        assert_eq!(
            c.get("nervocure").unwrap().link,
            "https://renovacaocosmica.shop/23/nervocuretic"
        );
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut c = catalog();
        c.apply_checkout_overrides(|_| Some("   ".to_string()));
        assert_eq!(
            c.get("100queda").unwrap().link,
            "https://ev.braip.com/ref?pv=pro4rxm7&af=afivpggv51"
        );
    }

    #[test]
    fn test_configured_keywords_are_normalized() {
        let c = Catalog::new(vec![ProductEntry {
            keyword: "  Chá Verde ".into(),
            description: "Detox".into(),
            link: "https://x".into(),
            aliases: vec![" Matcha ".into(), "  ".into()],
            checkout_env: None,
        }]);
        assert!(c.find("quero CHÁ VERDE").is_some());
        assert!(c.find("tem MATCHA?").is_some());
        assert_eq!(c.get("chá verde").unwrap().aliases, vec!["matcha".to_string()]);
    }

    #[test]
    fn test_find_matches_short_product_names() {
        let c = catalog();
        let p = c.find("quero o sono profundo").unwrap();
        assert_eq!(p.keyword, "sono profundo, vida renovada");
        assert!(p.card().contains("https://renovacaocosmica.shop/23/sono-fnl"));

        let p = c.find("me fala dos 15 alongamentos").unwrap();
        assert_eq!(p.keyword, "os alongamentos essenciais");
    }

    #[test]
    fn test_dor_sob_controle_uses_its_checkout_env() {
        let mut c = catalog();
        assert_eq!(
            c.find("preciso do Dor Sob Controle").unwrap().link,
            "https://renovacaocosmica.shop/23/fnl-inicial"
        );
        c.apply_checkout_overrides(|key| {
            (key == "CHECKOUT_DOR_CONTROLE").then(|| "https://pay.example/dor".to_string())
        });
        assert_eq!(c.get("dor sob controle").unwrap().link, "https://pay.example/dor");
    }
}
