//! The built-in catalog, used until the host picks a topic and whenever a
//! generated list comes back empty.

use crate::WordList;

const DEFAULT_WORDS: &[(&str, &str)] = &[
    ("pizza", "forno"),
    ("mare", "sale"),
    ("montagna", "neve"),
    ("gatto", "fusa"),
    ("cane", "fedele"),
    ("treno", "binario"),
    ("aereo", "decollo"),
    ("biblioteca", "silenzio"),
    ("ospedale", "barella"),
    ("scuola", "campanella"),
    ("cinema", "popcorn"),
    ("calcio", "rigore"),
    ("chitarra", "corde"),
    ("pianoforte", "tasti"),
    ("orologio", "lancette"),
    ("ombrello", "pioggia"),
    ("caffè", "moka"),
    ("gelato", "cono"),
    ("spiaggia", "ombrellone"),
    ("castello", "torre"),
    ("pirata", "tesoro"),
    ("astronauta", "orbita"),
    ("vulcano", "lava"),
    ("deserto", "duna"),
    ("foresta", "muschio"),
    ("ponte", "arcata"),
    ("faro", "naufragio"),
    ("circo", "tendone"),
    ("museo", "quadro"),
    ("supermercato", "carrello"),
    ("bicicletta", "pedali"),
    ("telefono", "squillo"),
    ("computer", "tastiera"),
    ("matrimonio", "anelli"),
    ("compleanno", "candeline"),
    ("natale", "presepe"),
    ("carnevale", "maschera"),
    ("vampiro", "notte"),
    ("drago", "leggenda"),
    ("robot", "circuito"),
];

/// Returns a fresh copy of the built-in word → hint mapping.
pub fn default_word_list() -> WordList {
    DEFAULT_WORDS
        .iter()
        .map(|(word, hint)| (word.to_string(), Some(hint.to_string())))
        .collect()
}
