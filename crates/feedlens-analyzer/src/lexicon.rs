//! Valence lexicon for the local sentiment analyzer
//!
//! Word valences are on a [-4, 4] scale before normalization. The tables
//! are biased toward product-feedback vocabulary since that is the traffic
//! this engine sees.

/// Single-token valences
pub const WORDS: &[(&str, f32)] = &[
    // Positive
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("better", 1.9),
    ("brilliant", 2.8),
    ("clean", 1.7),
    ("convenient", 1.8),
    ("delightful", 2.9),
    ("easy", 1.9),
    ("efficient", 1.8),
    ("enjoy", 2.0),
    ("enjoyable", 2.2),
    ("excellent", 3.2),
    ("fantastic", 3.0),
    ("fast", 1.7),
    ("favorite", 2.0),
    ("flawless", 2.9),
    ("fun", 2.1),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.9),
    ("impressed", 2.3),
    ("impressive", 2.3),
    ("intuitive", 1.9),
    ("like", 1.5),
    ("love", 3.2),
    ("loved", 3.0),
    ("nice", 1.8),
    ("perfect", 3.1),
    ("pleasant", 2.1),
    ("polished", 1.8),
    ("recommend", 2.2),
    ("reliable", 2.0),
    ("responsive", 1.7),
    ("satisfied", 2.1),
    ("seamless", 2.2),
    ("simple", 1.4),
    ("smooth", 1.8),
    ("solid", 1.5),
    ("stable", 1.6),
    ("stunning", 2.7),
    ("superb", 3.0),
    ("useful", 1.9),
    ("wonderful", 2.9),
    ("works", 1.2),
    // Negative
    ("annoying", -2.1),
    ("awful", -3.1),
    ("bad", -2.5),
    ("broken", -2.4),
    ("buggy", -2.3),
    ("bug", -1.8),
    ("bugs", -1.8),
    ("clunky", -1.9),
    ("confusing", -1.9),
    ("crash", -2.6),
    ("crashed", -2.6),
    ("crashes", -2.6),
    ("disappointed", -2.4),
    ("disappointing", -2.4),
    ("expensive", -1.5),
    ("fail", -2.3),
    ("fails", -2.3),
    ("failure", -2.4),
    ("freeze", -2.1),
    ("freezes", -2.1),
    ("frustrated", -2.3),
    ("frustrating", -2.3),
    ("garbage", -2.9),
    ("hate", -3.1),
    ("horrible", -3.0),
    ("issue", -1.3),
    ("issues", -1.3),
    ("lag", -1.8),
    ("laggy", -1.9),
    ("lose", -1.7),
    ("lost", -1.7),
    ("mediocre", -1.2),
    ("mess", -2.0),
    ("missing", -1.4),
    ("painful", -2.2),
    ("poor", -2.3),
    ("problem", -1.5),
    ("problems", -1.5),
    ("sad", -1.9),
    ("slow", -1.7),
    ("terrible", -3.0),
    ("ugly", -2.1),
    ("unreliable", -2.2),
    ("unusable", -2.7),
    ("useless", -2.6),
    ("worst", -3.2),
    ("worthless", -2.8),
    ("wrong", -1.8),
];

/// Multi-word phrase valences, matched over the raw lowercased text.
///
/// Phrases are chosen so their component tokens are not themselves in
/// [`WORDS`], keeping a single hit from counting twice.
pub const PHRASES: &[(&str, f32)] = &[
    ("five stars", 3.0),
    ("game changer", 2.8),
    ("works like a charm", 3.0),
    ("exceeded my expectations", 2.7),
    ("highly recommended", 2.6),
    ("top notch", 2.5),
    ("waste of money", -2.9),
    ("waste of time", -2.7),
    ("deal breaker", -2.5),
    ("uninstalled it", -2.4),
    ("asking for a refund", -2.6),
    ("does the job", 1.4),
    ("room for improvement", -0.9),
    ("falls short", -1.8),
];

/// Tokens that flip the valence of a following sentiment word
pub const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "without", "hardly", "barely", "don't", "doesn't",
    "didn't", "can't", "cannot", "couldn't", "won't", "wouldn't", "isn't", "wasn't", "aren't",
    "weren't", "ain't",
];

/// Degree modifiers and their boost applied to the next sentiment word.
/// Positive boosts intensify, negative boosts dampen.
pub const BOOSTERS: &[(&str, f32)] = &[
    ("absolutely", 0.293),
    ("completely", 0.293),
    ("extremely", 0.293),
    ("incredibly", 0.293),
    ("really", 0.293),
    ("so", 0.293),
    ("super", 0.293),
    ("totally", 0.293),
    ("utterly", 0.293),
    ("very", 0.293),
    ("kinda", -0.293),
    ("marginally", -0.293),
    ("slightly", -0.293),
    ("somewhat", -0.293),
    ("sorta", -0.293),
];
