//! File-backed profile store.
//!
//! One JSON document per data domain (cards, alternative-payment), keyed
//! country → type → name. The whole document is rewritten on every save;
//! deleting the last profile under a type or country prunes the empty
//! branch. A missing document is seeded with a small starter set so a
//! fresh checkout has something to select.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::{
    error::{Result, TesterError},
    model::{FieldModel, ProfileCategory, Scenario},
    profile::{Profile, ProfileIdentity},
};

/// Persistence seam for profile records.
///
/// The engine treats implementors purely as a source/sink of [`Profile`]s;
/// when and whether to call [`save`](Self::save) is the caller's decision.
pub trait ProfileStore {
    /// Loads every profile usable with the given scenario.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Io`] on read failures and
    /// [`TesterError::Store`] on undecodable documents.
    fn load(&self, scenario: Scenario) -> Result<Vec<Profile>>;

    /// Inserts or replaces a profile in the scenario's domain.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Io`] on write failures.
    fn save(&mut self, profile: &Profile, scenario: Scenario) -> Result<()>;

    /// Removes a profile, pruning empty branches.
    ///
    /// # Errors
    ///
    /// Returns [`TesterError::Store`] when the profile does not exist.
    fn delete(&mut self, identity: &ProfileIdentity, scenario: Scenario) -> Result<()>;
}

/// On-disk record: everything in [`Profile`] except the keys the document
/// structure already encodes.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProfile {
    fields: FieldModel,
    #[serde(default)]
    overrides: BTreeMap<Scenario, Value>,
}

/// country → type → name → record.
type Document = BTreeMap<String, BTreeMap<String, BTreeMap<String, StoredProfile>>>;

/// JSON-file implementation of [`ProfileStore`].
#[derive(Debug)]
pub struct FileProfileStore {
    data_dir: PathBuf,
}

impl FileProfileStore {
    /// Creates a store rooted at `data_dir`. The directory is created on
    /// first write, not here.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    fn domain_file(&self, category: ProfileCategory) -> PathBuf {
        let file = match category {
            ProfileCategory::Card => "cards.json",
            ProfileCategory::AlternativePayment => "apm-profiles.json",
        };
        self.data_dir.join(file)
    }

    #[instrument(skip(self))]
    fn read_document(&self, category: ProfileCategory) -> Result<Document> {
        let path = self.domain_file(category);
        if !path.exists() {
            info!(path = %path.display(), "store document missing, seeding starter data");
            let seeded = seed_document(category);
            self.write_document(&path, &seeded)?;
            return Ok(seeded);
        }
        let text = fs::read_to_string(&path)?;
        serde_json::from_str(&text).map_err(|e| {
            TesterError::Store(format!("undecodable document {}: {e}", path.display()))
        })
    }

    fn write_document(&self, path: &Path, document: &Document) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| TesterError::Store(format!("unencodable document: {e}")))?;
        fs::write(path, text)?;
        debug!(path = %path.display(), "store document written");
        Ok(())
    }
}

impl ProfileStore for FileProfileStore {
    fn load(&self, scenario: Scenario) -> Result<Vec<Profile>> {
        let category = scenario.category();
        let document = self.read_document(category)?;

        let mut profiles = Vec::new();
        for (country, types) in document {
            for (type_code, names) in types {
                for (name, record) in names {
                    profiles.push(Profile {
                        identity: ProfileIdentity {
                            name,
                            country: country.clone(),
                            category,
                        },
                        type_code: type_code.clone(),
                        fields: record.fields,
                        overrides: record.overrides,
                    });
                }
            }
        }
        Ok(profiles)
    }

    #[instrument(skip(self, profile), fields(name = %profile.identity.name))]
    fn save(&mut self, profile: &Profile, scenario: Scenario) -> Result<()> {
        let category = scenario.category();
        let mut document = self.read_document(category)?;

        document
            .entry(profile.identity.country.clone())
            .or_default()
            .entry(profile.type_code.clone())
            .or_default()
            .insert(
                profile.identity.name.clone(),
                StoredProfile {
                    fields: profile.fields.clone(),
                    overrides: profile.overrides.clone(),
                },
            );

        self.write_document(&self.domain_file(category), &document)?;
        info!("profile saved");
        Ok(())
    }

    #[instrument(skip(self), fields(name = %identity.name))]
    fn delete(&mut self, identity: &ProfileIdentity, scenario: Scenario) -> Result<()> {
        let category = scenario.category();
        let mut document = self.read_document(category)?;

        let removed = document.get_mut(&identity.country).is_some_and(|types| {
            let mut hit = false;
            types.retain(|_, names| {
                if !hit && names.remove(&identity.name).is_some() {
                    hit = true;
                }
                !names.is_empty()
            });
            hit
        });
        if !removed {
            return Err(TesterError::Store(format!(
                "profile '{}' not found in {}",
                identity.name, identity.country
            )));
        }
        document.retain(|_, types| !types.is_empty());

        self.write_document(&self.domain_file(category), &document)?;
        info!("profile deleted");
        Ok(())
    }
}

/// Starter data written when a domain document is missing.
fn seed_document(category: ProfileCategory) -> Document {
    let mut document = Document::new();
    match category {
        ProfileCategory::Card => {
            let mut visa_fields = FieldModel::reset(ProfileCategory::Card);
            let _ = visa_fields.set_text("card_number", "4111111111111111");

            let mut mastercard_fields = FieldModel::reset(ProfileCategory::Card);
            let _ = mastercard_fields.set_text("card_number", "5555555555554444");

            let mut visa = BTreeMap::new();
            visa.insert(
                "ng-visa-default".to_owned(),
                StoredProfile { fields: visa_fields, overrides: BTreeMap::new() },
            );
            let mut mastercard = BTreeMap::new();
            mastercard.insert(
                "ng-mastercard-default".to_owned(),
                StoredProfile { fields: mastercard_fields, overrides: BTreeMap::new() },
            );

            let mut types = BTreeMap::new();
            types.insert("visa".to_owned(), visa);
            types.insert("mastercard".to_owned(), mastercard);
            document.insert("NG".to_owned(), types);
        }
        ProfileCategory::AlternativePayment => {
            let fields = FieldModel::reset(ProfileCategory::AlternativePayment);
            let mut mpesa = BTreeMap::new();
            mpesa.insert(
                "ke-mpesa-default".to_owned(),
                StoredProfile { fields, overrides: BTreeMap::new() },
            );
            let mut types = BTreeMap::new();
            types.insert("mpesa".to_owned(), mpesa);
            document.insert("KE".to_owned(), types);
        }
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, FileProfileStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = FileProfileStore::new(dir.path());
        (dir, store)
    }

    fn sample_profile(name: &str) -> Profile {
        Profile::new(
            ProfileIdentity {
                name: name.to_owned(),
                country: "ZA".to_owned(),
                category: ProfileCategory::Card,
            },
            "mastercard",
            FieldModel::reset(ProfileCategory::Card),
        )
    }

    #[test]
    fn test_missing_document_is_seeded() {
        let (_dir, store) = store();
        let profiles = store.load(Scenario::Unauthenticated).unwrap();
        assert!(!profiles.is_empty());
        assert!(profiles.iter().any(|p| p.identity.name == "ng-visa-default"));
        assert!(store.domain_file(ProfileCategory::Card).exists());
    }

    #[test]
    fn test_apm_domain_is_separate() {
        let (_dir, store) = store();
        let apm = store.load(Scenario::AlternativePayment).unwrap();
        assert!(apm.iter().all(|p| p.identity.category == ProfileCategory::AlternativePayment));
        assert!(apm.iter().any(|p| p.type_code == "mpesa"));
        assert!(!store.domain_file(ProfileCategory::Card).exists());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_dir, mut store) = store();
        let mut profile = sample_profile("za-mc-test");
        profile
            .overrides
            .insert(Scenario::Authenticated, json!({"payment": {"amount_total": "2.00"}}));

        store.save(&profile, Scenario::Authenticated).unwrap();
        let loaded = store.load(Scenario::Authenticated).unwrap();
        let found = loaded.iter().find(|p| p.identity.name == "za-mc-test").unwrap();
        assert_eq!(found, &profile);
    }

    #[test]
    fn test_save_replaces_existing_record() {
        let (_dir, mut store) = store();
        let mut profile = sample_profile("za-mc-test");
        store.save(&profile, Scenario::Unauthenticated).unwrap();

        profile.fields.set_text("card_cvv", "987").unwrap();
        store.save(&profile, Scenario::Unauthenticated).unwrap();

        let loaded = store.load(Scenario::Unauthenticated).unwrap();
        let matching: Vec<_> =
            loaded.iter().filter(|p| p.identity.name == "za-mc-test").collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].fields.get("card_cvv").unwrap().display(), "987");
    }

    #[test]
    fn test_delete_removes_profile_and_prunes_empty_branches() {
        let (_dir, mut store) = store();
        let profile = sample_profile("za-mc-test");
        store.save(&profile, Scenario::Unauthenticated).unwrap();
        store.delete(&profile.identity, Scenario::Unauthenticated).unwrap();

        let loaded = store.load(Scenario::Unauthenticated).unwrap();
        assert!(loaded.iter().all(|p| p.identity.name != "za-mc-test"));

        // The ZA branch is gone entirely, not left as an empty object.
        let text = fs::read_to_string(store.domain_file(ProfileCategory::Card)).unwrap();
        let document: Value = serde_json::from_str(&text).unwrap();
        assert!(document.get("ZA").is_none());
    }

    #[test]
    fn test_delete_unknown_profile_errors() {
        let (_dir, mut store) = store();
        let profile = sample_profile("never-saved");
        // Seed the document first so the error is about the profile.
        let _ = store.load(Scenario::Unauthenticated).unwrap();

        let result = store.delete(&profile.identity, Scenario::Unauthenticated);
        assert!(matches!(result, Err(TesterError::Store(_))));
    }

    #[test]
    fn test_corrupt_document_surfaces_store_error() {
        let (dir, store) = store();
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(store.domain_file(ProfileCategory::Card), "{not json").unwrap();

        let result = store.load(Scenario::Unauthenticated);
        assert!(matches!(result, Err(TesterError::Store(_))));
    }
}
