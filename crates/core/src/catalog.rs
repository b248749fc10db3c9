//! Question Catalog
//!
//! The catalog is the immutable source of every question the engine can ask.
//! It is loaded once at process start from a JSON document, normalized into a
//! flat label-keyed map, validated (non-empty, dependencies resolvable and
//! acyclic), and then shared read-only by all sessions.
//!
//! Two document shapes are accepted:
//!
//! 1. The nested shape: `categories -> subcategories -> {label: text}` with
//!    top-level `question_dependencies`, `question_priorities`, and a
//!    `flow_order` of single-letter category codes.
//! 2. The flat legacy shape: a `questions` array of
//!    `{id, category, question, dependencies, priority}` with a `flow_order`
//!    of category names. The loader assigns structured labels and remaps the
//!    old ids onto them.

use crate::error::CatalogError;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::Path;

/// Category-name to letter-code mapping used when normalizing the flat shape.
const CATEGORY_CODES: &[(&str, &str)] = &[
    ("introduction", "A"),
    ("demographics", "B"),
    ("chief_complaint", "C"),
    ("history_of_present_illness", "D"),
    ("past_medical_history", "E"),
    ("medications", "F"),
    ("allergies", "G"),
    ("family_history", "H"),
    ("social_history", "I"),
    ("review_of_systems", "J"),
    ("vital_signs", "K"),
    ("assessment", "L"),
];

/// How many questions share a subcategory before the flat-shape loader
/// advances to the next subcategory letter.
const FLAT_SUBCATEGORY_SPAN: usize = 5;

/// A single immutable question definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDef {
    /// Unique label, e.g. "AA_1". Internal only; never shown to end users.
    pub label: String,
    /// The literal question text presented to the user.
    pub text: String,
    /// Single-letter category code ("A", "B", ...).
    pub category: String,
    /// Human-readable category title.
    pub category_title: String,
    /// Subcategory code ("AA", "AB", ...).
    pub subcategory: String,
    /// Lower asks earlier at equal category and sequence. Unset sorts last.
    pub priority: Option<u32>,
    /// Labels that must all be answered before this question is eligible.
    pub dependencies: BTreeSet<String>,
    /// Intra-subcategory ordinal parsed from the label suffix. A label
    /// without a numeric suffix has no sequence and sorts last.
    pub sequence: Option<u32>,
}

/// The loaded, validated catalog: presentation order plus the label-keyed map.
#[derive(Debug, Clone)]
pub struct Catalog {
    flow_order: Vec<String>,
    questions: BTreeMap<String, QuestionDef>,
}

// --- Document shapes ---

#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub flow_order: Vec<String>,
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryDoc>,
    #[serde(default)]
    pub question_dependencies: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub question_priorities: BTreeMap<String, u32>,
    #[serde(default)]
    pub questions: Vec<FlatQuestionDoc>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryDoc {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subcategories: BTreeMap<String, SubcategoryDoc>,
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryDoc {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct FlatQuestionDoc {
    pub id: String,
    pub category: String,
    pub question: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub priority: Option<u32>,
}

impl Catalog {
    /// Loads and validates a catalog from a JSON file. Fatal on any failure.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Parses and validates a catalog from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(raw)?;
        Self::from_document(doc)
    }

    /// Normalizes either document shape into the label-keyed catalog and
    /// validates it.
    pub fn from_document(doc: CatalogDocument) -> Result<Self, CatalogError> {
        let has_nested = doc.categories.values().any(|c| !c.subcategories.is_empty());

        let catalog = if has_nested {
            Self::from_nested(doc)
        } else {
            Self::from_flat(doc)
        };

        catalog.validate()?;
        Ok(catalog)
    }

    fn from_nested(doc: CatalogDocument) -> Self {
        let mut questions = BTreeMap::new();
        for (cat_code, cat) in &doc.categories {
            for (sub_code, sub) in &cat.subcategories {
                for (label, text) in &sub.questions {
                    let dependencies = doc
                        .question_dependencies
                        .get(label)
                        .map(|deps| deps.iter().cloned().collect())
                        .unwrap_or_default();
                    questions.insert(
                        label.clone(),
                        QuestionDef {
                            label: label.clone(),
                            text: text.clone(),
                            category: cat_code.clone(),
                            category_title: cat.title.clone(),
                            subcategory: sub_code.clone(),
                            priority: doc.question_priorities.get(label).copied(),
                            dependencies,
                            sequence: parse_sequence(label),
                        },
                    );
                }
            }
        }
        Self {
            flow_order: doc.flow_order,
            questions,
        }
    }

    fn from_flat(doc: CatalogDocument) -> Self {
        let code_map: HashMap<&str, &str> = CATEGORY_CODES.iter().copied().collect();

        // First pass: assign structured labels per category in document order.
        let mut questions = BTreeMap::new();
        let mut old_to_new: HashMap<String, String> = HashMap::new();
        let mut per_category: HashMap<String, (usize, String)> = HashMap::new();
        for q in &doc.questions {
            let code = code_map.get(q.category.as_str()).copied().unwrap_or("Z");
            let (count, subcat) = per_category
                .entry(q.category.clone())
                .or_insert_with(|| (0, format!("{}A", code)));
            *count += 1;
            let label = format!("{}_{}", subcat, count);
            let assigned_subcat = subcat.clone();
            if *count % FLAT_SUBCATEGORY_SPAN == 0 {
                *subcat = advance_subcategory(subcat);
            }
            old_to_new.insert(q.id.clone(), label.clone());
            let title = title_case(&q.category);
            questions.insert(
                label.clone(),
                QuestionDef {
                    label: label.clone(),
                    text: q.question.clone(),
                    category: code.to_string(),
                    category_title: title.clone(),
                    subcategory: assigned_subcat,
                    priority: q.priority,
                    dependencies: BTreeSet::new(),
                    sequence: parse_sequence(&label),
                },
            );
        }

        // Second pass: remap dependencies from old ids to the new labels.
        for q in &doc.questions {
            if q.dependencies.is_empty() {
                continue;
            }
            if let Some(label) = old_to_new.get(&q.id) {
                let deps: BTreeSet<String> = q
                    .dependencies
                    .iter()
                    .map(|old| old_to_new.get(old).cloned().unwrap_or_else(|| old.clone()))
                    .collect();
                if let Some(def) = questions.get_mut(label) {
                    def.dependencies = deps;
                }
            }
        }

        // Translate the flow order of category names into letter codes,
        // dropping names that map to nothing.
        let flow_order = doc
            .flow_order
            .iter()
            .filter_map(|name| code_map.get(name.as_str()).map(|c| c.to_string()))
            .collect();

        Self {
            flow_order,
            questions,
        }
    }

    /// Validates the normalized catalog: non-empty, every dependency names a
    /// known label, and the dependency relation is a DAG (Kahn's algorithm).
    fn validate(&self) -> Result<(), CatalogError> {
        if self.questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        for def in self.questions.values() {
            for dep in &def.dependencies {
                if !self.questions.contains_key(dep) {
                    return Err(CatalogError::UnknownDependency {
                        label: def.label.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        // Kahn's topological sort over the dependency edges. Any label left
        // with a nonzero in-degree sits on a cycle.
        let mut in_degree: BTreeMap<&str, usize> = self
            .questions
            .values()
            .map(|def| (def.label.as_str(), def.dependencies.len()))
            .collect();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for def in self.questions.values() {
            for dep in &def.dependencies {
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(def.label.as_str());
            }
        }

        let mut queue: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(l, _)| *l)
            .collect();
        let mut resolved = 0usize;
        while let Some(label) = queue.pop_front() {
            resolved += 1;
            if let Some(next) = dependents.get(label) {
                for dependent in next {
                    if let Some(d) = in_degree.get_mut(dependent) {
                        *d -= 1;
                        if *d == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        if resolved < self.questions.len() {
            let cyclic: Vec<&str> = in_degree
                .iter()
                .filter(|(_, d)| **d > 0)
                .map(|(l, _)| *l)
                .collect();
            return Err(CatalogError::DependencyCycle(cyclic.join(", ")));
        }

        Ok(())
    }

    /// Looks up a question definition by label.
    pub fn get(&self, label: &str) -> Option<&QuestionDef> {
        self.questions.get(label)
    }

    /// Iterates over all question definitions in label order.
    pub fn questions(&self) -> impl Iterator<Item = &QuestionDef> {
        self.questions.values()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Position of a category code in the presentation order. Unknown
    /// categories sort after all known ones.
    pub fn flow_position(&self, category: &str) -> usize {
        self.flow_order
            .iter()
            .position(|c| c == category)
            .unwrap_or(usize::MAX)
    }

    pub fn flow_order(&self) -> &[String] {
        &self.flow_order
    }
}

/// Parses the intra-subcategory ordinal from a label suffix ("AA_3" -> 3).
fn parse_sequence(label: &str) -> Option<u32> {
    label.rsplit_once('_').and_then(|(_, n)| n.parse().ok())
}

/// Advances a subcategory code to the next letter ("AA" -> "AB"), wrapping
/// back to "A" after "Z".
fn advance_subcategory(subcat: &str) -> String {
    let mut chars: Vec<char> = subcat.chars().collect();
    if let Some(last) = chars.last_mut() {
        *last = if *last == 'Z' {
            'A'
        } else {
            ((*last as u8) + 1) as char
        };
    }
    chars.into_iter().collect()
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested_doc() -> &'static str {
        r#"{
            "flow_order": ["A", "B"],
            "categories": {
                "A": {
                    "title": "Introduction",
                    "subcategories": {
                        "AA": {
                            "title": "Readiness",
                            "questions": {
                                "AA_1": "Are you ready to begin the consultation?",
                                "AA_2": "Do you consent to these questions being recorded?"
                            }
                        }
                    }
                },
                "B": {
                    "title": "Demographics",
                    "subcategories": {
                        "BA": {
                            "title": "Basics",
                            "questions": {
                                "BA_1": "What is your age?"
                            }
                        }
                    }
                }
            },
            "question_dependencies": {
                "AA_2": ["AA_1"],
                "BA_1": ["AA_1"]
            },
            "question_priorities": {
                "AA_1": 1,
                "AA_2": 2,
                "BA_1": 1
            }
        }"#
    }

    #[test]
    fn test_load_nested_shape() {
        let catalog = Catalog::from_json_str(nested_doc()).unwrap();
        assert_eq!(catalog.len(), 3);

        let q = catalog.get("AA_2").unwrap();
        assert_eq!(q.category, "A");
        assert_eq!(q.category_title, "Introduction");
        assert_eq!(q.subcategory, "AA");
        assert_eq!(q.priority, Some(2));
        assert!(q.dependencies.contains("AA_1"));
        assert_eq!(q.sequence, Some(2));

        assert_eq!(catalog.flow_position("A"), 0);
        assert_eq!(catalog.flow_position("B"), 1);
        assert_eq!(catalog.flow_position("Q"), usize::MAX);
    }

    #[test]
    fn test_load_flat_shape_assigns_labels_and_remaps_dependencies() {
        let raw = r#"{
            "flow_order": ["introduction", "demographics"],
            "questions": [
                {"id": "intro_1", "category": "introduction", "question": "Are you ready to begin?", "priority": 1},
                {"id": "demo_1", "category": "demographics", "question": "What is your age?", "dependencies": ["intro_1"], "priority": 1},
                {"id": "demo_2", "category": "demographics", "question": "What is your gender?", "dependencies": ["demo_1"], "priority": 2}
            ]
        }"#;
        let catalog = Catalog::from_json_str(raw).unwrap();
        assert_eq!(catalog.len(), 3);

        let intro = catalog.get("AA_1").unwrap();
        assert_eq!(intro.text, "Are you ready to begin?");
        assert_eq!(intro.category, "A");

        let age = catalog.get("BA_1").unwrap();
        assert_eq!(age.category, "B");
        assert_eq!(age.category_title, "Demographics");
        assert!(age.dependencies.contains("AA_1"));

        let gender = catalog.get("BA_2").unwrap();
        assert!(gender.dependencies.contains("BA_1"));

        // Category names in flow_order become letter codes.
        assert_eq!(catalog.flow_order(), &["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_flat_shape_advances_subcategory_every_span() {
        let questions: Vec<String> = (1..=7)
            .map(|i| {
                format!(
                    r#"{{"id": "m_{i}", "category": "medications", "question": "Medication question number {i}?"}}"#
                )
            })
            .collect();
        let raw = format!(
            r#"{{"flow_order": ["medications"], "questions": [{}]}}"#,
            questions.join(",")
        );
        let catalog = Catalog::from_json_str(&raw).unwrap();

        assert!(catalog.get("FA_5").is_some());
        assert!(catalog.get("FB_6").is_some());
        assert!(catalog.get("FB_7").is_some());
    }

    #[test]
    fn test_unknown_flat_category_sorts_into_z() {
        let raw = r#"{
            "flow_order": [],
            "questions": [
                {"id": "x", "category": "mystery", "question": "A question with no home category?"}
            ]
        }"#;
        let catalog = Catalog::from_json_str(raw).unwrap();
        assert_eq!(catalog.get("ZA_1").unwrap().category, "Z");
    }

    #[test]
    fn test_empty_catalog_fails() {
        let err = Catalog::from_json_str(r#"{"flow_order": []}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Empty));
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = Catalog::from_json_str("not json").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed(_)));
    }

    #[test]
    fn test_unknown_dependency_fails() {
        let raw = r#"{
            "flow_order": ["A"],
            "categories": {
                "A": {
                    "title": "Intro",
                    "subcategories": {
                        "AA": {"title": "T", "questions": {"AA_1": "Are you ready to begin?"}}
                    }
                }
            },
            "question_dependencies": {"AA_1": ["ZZ_9"]}
        }"#;
        let err = Catalog::from_json_str(raw).unwrap_err();
        match err {
            CatalogError::UnknownDependency { label, dependency } => {
                assert_eq!(label, "AA_1");
                assert_eq!(dependency, "ZZ_9");
            }
            other => panic!("expected UnknownDependency, got {:?}", other),
        }
    }

    #[test]
    fn test_dependency_cycle_fails_at_load() {
        let raw = r#"{
            "flow_order": ["A"],
            "categories": {
                "A": {
                    "title": "Intro",
                    "subcategories": {
                        "AA": {
                            "title": "T",
                            "questions": {
                                "AA_1": "First question in the cycle?",
                                "AA_2": "Second question in the cycle?"
                            }
                        }
                    }
                }
            },
            "question_dependencies": {
                "AA_1": ["AA_2"],
                "AA_2": ["AA_1"]
            }
        }"#;
        let err = Catalog::from_json_str(raw).unwrap_err();
        match err {
            CatalogError::DependencyCycle(labels) => {
                assert!(labels.contains("AA_1"));
                assert!(labels.contains("AA_2"));
            }
            other => panic!("expected DependencyCycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let raw = r#"{
            "flow_order": ["A"],
            "categories": {
                "A": {
                    "title": "Intro",
                    "subcategories": {
                        "AA": {"title": "T", "questions": {"AA_1": "Do you depend on yourself?"}}
                    }
                }
            },
            "question_dependencies": {"AA_1": ["AA_1"]}
        }"#;
        let err = Catalog::from_json_str(raw).unwrap_err();
        assert!(matches!(err, CatalogError::DependencyCycle(_)));
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("AA_1"), Some(1));
        assert_eq!(parse_sequence("BA_12"), Some(12));
        assert_eq!(parse_sequence("AA_x"), None);
        assert_eq!(parse_sequence("nolabel"), None);
    }

    #[test]
    fn test_advance_subcategory() {
        assert_eq!(advance_subcategory("AA"), "AB");
        assert_eq!(advance_subcategory("FZ"), "FA");
    }
}
