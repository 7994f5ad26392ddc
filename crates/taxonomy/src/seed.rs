//! Baseline families every fresh catalog starts with.

use catalog_core::FamilyId;

use crate::family::{Family, FamilyDraft};

const DEFAULT_FAMILIES: [(u64, &str, &str); 3] = [
    (
        1,
        "Lácteos",
        "Productos derivados de la leche como yogurt, mantequilla y quesos.",
    ),
    (2, "Bebidas", "Bebidas gaseosas, jugos y aguas minerales."),
    (3, "Snacks", "Aperitivos dulces y salados para picar."),
];

/// The seed families with fixed ids, so reseeding is an upsert.
pub fn default_families() -> Vec<Family> {
    DEFAULT_FAMILIES
        .iter()
        .filter_map(|(id, name, description)| {
            Family::new(
                FamilyId::new(*id),
                FamilyDraft {
                    name: (*name).to_string(),
                    description: Some((*description).to_string()),
                },
            )
            .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_three_families_with_stable_ids() {
        let families = default_families();
        let ids: Vec<u64> = families.iter().map(|f| f.id_typed().value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(families[1].name(), "Bebidas");
    }
}
