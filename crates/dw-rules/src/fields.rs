//! Field-value dispatch over ingredient records.
//!
//! Rules address ingredient fields by name. The extractor below is the
//! statically-typed equivalent of reading attributes reflectively: a match
//! over the known field names, including the derived `meat_fish_derived`
//! predicate.

use dw_ontology::Ingredient;
use serde_json::Value;

/// A rule-visible view of one ingredient field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Str(Option<String>),
    Num(Option<f64>),
    List(Vec<String>),
}

impl FieldValue {
    /// JSON representation used for equality comparisons (None -> null).
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Str(Some(s)) => Value::String(s.clone()),
            FieldValue::Str(None) => Value::Null,
            FieldValue::Num(Some(n)) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Num(None) => Value::Null,
            FieldValue::List(items) => {
                Value::Array(items.iter().map(|s| Value::String(s.clone())).collect())
            }
        }
    }
}

/// Read an ingredient field by rule name. Returns None for a field the
/// schema does not define (the rule then never matches).
pub fn ingredient_field(ing: &Ingredient, field: &str) -> Option<FieldValue> {
    let value = match field {
        "id" => FieldValue::Str(Some(ing.id.clone())),
        "canonical_name" => FieldValue::Str(Some(ing.canonical_name.clone())),
        "aliases" => FieldValue::List(ing.aliases.clone()),
        "derived_from" => FieldValue::List(ing.derived_from.clone()),
        "contains" => FieldValue::List(ing.contains.clone()),
        "may_contain" => FieldValue::List(ing.may_contain.clone()),
        "animal_origin" => FieldValue::Bool(ing.animal_origin),
        "plant_origin" => FieldValue::Bool(ing.plant_origin),
        "synthetic" => FieldValue::Bool(ing.synthetic),
        "fungal" => FieldValue::Bool(ing.fungal),
        "insect_derived" => FieldValue::Bool(ing.insect_derived),
        "animal_species" => FieldValue::Str(ing.animal_species.clone()),
        "egg_source" => FieldValue::Bool(ing.egg_source),
        "dairy_source" => FieldValue::Bool(ing.dairy_source),
        "gluten_source" => FieldValue::Bool(ing.gluten_source),
        "nut_source" => FieldValue::Str(ing.nut_source.clone()),
        "soy_source" => FieldValue::Bool(ing.soy_source),
        "sesame_source" => FieldValue::Bool(ing.sesame_source),
        "alcohol_content" => FieldValue::Num(ing.alcohol_content),
        "root_vegetable" => FieldValue::Bool(ing.root_vegetable),
        "onion_source" => FieldValue::Bool(ing.onion_source),
        "garlic_source" => FieldValue::Bool(ing.garlic_source),
        "fermented" => FieldValue::Bool(ing.fermented),
        "uncertainty_flags" => FieldValue::List(ing.uncertainty_flags.clone()),
        "regions" => FieldValue::List(ing.regions.clone()),
        "meat_fish_derived" => FieldValue::Bool(ing.meat_fish_derived()),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pork() -> Ingredient {
        Ingredient {
            animal_origin: true,
            animal_species: Some("pig".to_string()),
            ..Ingredient::new("pork", "pork")
        }
    }

    #[test]
    fn test_bool_field() {
        assert_eq!(
            ingredient_field(&pork(), "animal_origin"),
            Some(FieldValue::Bool(true))
        );
    }

    #[test]
    fn test_derived_field() {
        assert_eq!(
            ingredient_field(&pork(), "meat_fish_derived"),
            Some(FieldValue::Bool(true))
        );
    }

    #[test]
    fn test_optional_string_field() {
        assert_eq!(
            ingredient_field(&pork(), "animal_species"),
            Some(FieldValue::Str(Some("pig".to_string())))
        );
        let water = Ingredient::new("water", "water");
        assert_eq!(
            ingredient_field(&water, "animal_species"),
            Some(FieldValue::Str(None))
        );
    }

    #[test]
    fn test_unknown_field_is_none() {
        assert!(ingredient_field(&pork(), "no_such_field").is_none());
    }
}
