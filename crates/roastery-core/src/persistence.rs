//! Save/Load functionality for customer state
//!
//! Two layers:
//! - Per-record JSON text for preferences, personalities and metrics,
//!   stored through a [`KeyValueStore`]. Decoding never fails: corrupt
//!   records are logged and replaced by fresh defaults.
//! - A versioned bincode snapshot of the whole registry.

use std::collections::HashMap;
use std::io::{Read, Write};

use rand::Rng;
use roastery_logic::personality::{AdaptationConfig, PersonalityProfile};
use roastery_logic::preferences::{CustomerPreferences, EvolutionConfig};
use serde::{Deserialize, Serialize};

use crate::components::{CustomerId, CustomerStats};
use crate::config::RegistryConfig;
use crate::learning::GlobalMetrics;
use crate::registry::CustomerRegistry;

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Key under which shop-wide metrics are stored.
pub const METRICS_KEY: &str = "roastery/global_metrics";

// ── Record codecs ──────────────────────────────────────────────────────

pub fn encode_preferences(prefs: &CustomerPreferences) -> Result<String, SaveError> {
    Ok(serde_json::to_string(prefs)?)
}

/// Decode preferences, falling back to fresh random ones on bad input.
pub fn decode_preferences(
    text: &str,
    config: &EvolutionConfig,
    rng: &mut impl Rng,
    now: f64,
) -> CustomerPreferences {
    match serde_json::from_str::<CustomerPreferences>(text) {
        Ok(mut prefs) => {
            prefs.sanitize(config);
            prefs
        }
        Err(e) => {
            log::warn!("corrupt preference record ({}), regenerating", e);
            CustomerPreferences::random(rng, now)
        }
    }
}

pub fn encode_personality(profile: &PersonalityProfile) -> Result<String, SaveError> {
    Ok(serde_json::to_string(profile)?)
}

/// Decode a personality, falling back to a fresh random one on bad input.
pub fn decode_personality(
    text: &str,
    config: &AdaptationConfig,
    rng: &mut impl Rng,
) -> PersonalityProfile {
    match serde_json::from_str::<PersonalityProfile>(text) {
        Ok(mut profile) => {
            profile.sanitize(config);
            profile
        }
        Err(e) => {
            log::warn!("corrupt personality record ({}), regenerating", e);
            PersonalityProfile::random(rng, config)
        }
    }
}

pub fn encode_metrics(metrics: &GlobalMetrics) -> Result<String, SaveError> {
    Ok(serde_json::to_string(metrics)?)
}

/// Decode metrics; missing fields take their defaults, bad input resets.
pub fn decode_metrics(text: &str) -> GlobalMetrics {
    serde_json::from_str(text).unwrap_or_else(|e| {
        log::warn!("corrupt metrics record ({}), resetting", e);
        GlobalMetrics::default()
    })
}

// ── Key-value storage ──────────────────────────────────────────────────

/// Wherever the host keeps text records.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory store, for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

fn preferences_key(id: &CustomerId) -> String {
    format!("roastery/customer/{}/preferences", id)
}

fn personality_key(id: &CustomerId) -> String {
    format!("roastery/customer/{}/personality", id)
}

/// Write one customer's records.
pub fn store_customer(
    store: &mut impl KeyValueStore,
    id: &CustomerId,
    prefs: &CustomerPreferences,
    personality: &PersonalityProfile,
) -> Result<(), SaveError> {
    store.store(&preferences_key(id), encode_preferences(prefs)?);
    store.store(&personality_key(id), encode_personality(personality)?);
    Ok(())
}

/// Read one customer's records. Missing or corrupt records are regenerated.
pub fn load_customer(
    store: &impl KeyValueStore,
    id: &CustomerId,
    config: &RegistryConfig,
    rng: &mut impl Rng,
    now: f64,
) -> (CustomerPreferences, PersonalityProfile) {
    let prefs = match store.load(&preferences_key(id)) {
        Some(text) => decode_preferences(&text, &config.evolution, rng, now),
        None => CustomerPreferences::random(rng, now),
    };
    let personality = match store.load(&personality_key(id)) {
        Some(text) => decode_personality(&text, &config.adaptation, rng),
        None => PersonalityProfile::random(rng, &config.adaptation),
    };
    (prefs, personality)
}

pub fn store_metrics(store: &mut impl KeyValueStore, metrics: &GlobalMetrics) -> Result<(), SaveError> {
    store.store(METRICS_KEY, encode_metrics(metrics)?);
    Ok(())
}

pub fn load_metrics(store: &impl KeyValueStore) -> GlobalMetrics {
    store
        .load(METRICS_KEY)
        .map(|text| decode_metrics(&text))
        .unwrap_or_default()
}

// ── Registry snapshot ──────────────────────────────────────────────────

/// Serializable snapshot of the registry
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in hours
    pub sim_time: f64,
    pub config: RegistryConfig,
    pub metrics: GlobalMetrics,
    /// All customers, sorted by id
    pub customers: Vec<SerializableCustomer>,
}

/// One customer entity with all its components
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct SerializableCustomer {
    pub id: CustomerId,
    pub preferences: CustomerPreferences,
    pub personality: PersonalityProfile,
    pub stats: CustomerStats,
}

/// Extract every customer from the registry world
fn serialize_customers(registry: &CustomerRegistry) -> Vec<SerializableCustomer> {
    let mut customers: Vec<SerializableCustomer> = registry
        .world
        .query::<(&CustomerId, &CustomerPreferences, &PersonalityProfile, &CustomerStats)>()
        .iter()
        .map(|(_, (id, prefs, personality, stats))| SerializableCustomer {
            id: id.clone(),
            preferences: prefs.clone(),
            personality: personality.clone(),
            stats: stats.clone(),
        })
        .collect();
    customers.sort_by(|a, b| a.id.cmp(&b.id));
    customers
}

/// Save the complete registry to a writer
pub fn save_registry<W: Write>(writer: W, registry: &CustomerRegistry) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time: registry.sim_time,
        config: registry.config.clone(),
        metrics: registry.metrics.clone(),
        customers: serialize_customers(registry),
    };

    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a registry snapshot from a reader
pub fn load_registry<R: Read>(reader: R) -> Result<LoadedRegistry, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let mut customers = save_data.customers;
    for customer in &mut customers {
        customer.preferences.sanitize(&save_data.config.evolution);
        customer.personality.sanitize(&save_data.config.adaptation);
    }

    Ok(LoadedRegistry {
        sim_time: save_data.sim_time,
        config: save_data.config,
        metrics: save_data.metrics,
        customers,
    })
}

/// Result of loading a registry snapshot
pub struct LoadedRegistry {
    pub sim_time: f64,
    pub config: RegistryConfig,
    pub metrics: GlobalMetrics,
    pub customers: Vec<SerializableCustomer>,
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
    DuplicateCustomer(CustomerId),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "Record encoding error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::DuplicateCustomer(id) => write!(f, "Duplicate customer: {}", id),
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use roastery_logic::personality::{BehaviorSign, Trigger};
    use roastery_logic::preferences::{FlavorNote, RoastLevel, ServedCoffee};
    use roastery_logic::quality::roast;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(17)
    }

    fn seasoned_preferences() -> CustomerPreferences {
        let mut r = rng();
        let config = EvolutionConfig::default();
        let mut prefs = CustomerPreferences::random(&mut r, 3.5);
        let cup = ServedCoffee {
            roast: RoastLevel::Dark,
            flavor: FlavorNote::Spicy,
            quality: 77.0,
        };
        for i in 0..25 {
            prefs.evolve(&cup, (i * 4) as f64, i as f64 * 1.25, &config, &mut r);
        }
        prefs
    }

    fn seasoned_personality() -> PersonalityProfile {
        let mut r = rng();
        let config = AdaptationConfig::default();
        let mut profile = PersonalityProfile::random(&mut r, &config);
        for day in 0..25 {
            let trigger = Trigger::ALL[day % Trigger::ALL.len()];
            profile.adapt(trigger, BehaviorSign::Positive, 0.13, day as f64 * 24.0, &config);
        }
        profile
    }

    #[test]
    fn preferences_round_trip() {
        let prefs = seasoned_preferences();
        let text = encode_preferences(&prefs).unwrap();
        let decoded = decode_preferences(&text, &EvolutionConfig::default(), &mut rng(), 0.0);
        assert_eq!(decoded, prefs);
    }

    #[test]
    fn empty_history_round_trips() {
        let prefs = CustomerPreferences::random(&mut rng(), 0.0);
        let text = encode_preferences(&prefs).unwrap();
        assert_eq!(decode_preferences(&text, &EvolutionConfig::default(), &mut rng(), 9.0), prefs);

        let profile = PersonalityProfile::default();
        let text = encode_personality(&profile).unwrap();
        assert_eq!(decode_personality(&text, &AdaptationConfig::default(), &mut rng()), profile);
    }

    #[test]
    fn personality_round_trip() {
        let profile = seasoned_personality();
        assert!(profile.last_update.is_some());
        let text = encode_personality(&profile).unwrap();
        let decoded = decode_personality(&text, &AdaptationConfig::default(), &mut rng());
        assert_eq!(decoded, profile);
    }

    #[test]
    fn computed_floats_round_trip_exactly() {
        use rand::Rng;

        let mut r = StdRng::seed_from_u64(2024);
        let evolution = EvolutionConfig::default();
        let adaptation = AdaptationConfig::default();
        for _ in 0..200 {
            let created: f64 = r.gen_range(0.0..500.0);
            let mut prefs = CustomerPreferences::random(&mut r, created);
            let mut profile = PersonalityProfile::random(&mut r, &adaptation);
            let mut now: f64 = r.gen_range(0.0..10.0);
            for _ in 0..30 {
                let cup = ServedCoffee {
                    roast: RoastLevel::ALL[r.gen_range(0..RoastLevel::ALL.len())],
                    flavor: FlavorNote::ALL[r.gen_range(0..FlavorNote::ALL.len())],
                    quality: r.gen_range(0.0..100.0),
                };
                let satisfaction = r.gen_range(0.0..100.0);
                prefs.evolve(&cup, satisfaction, now, &evolution, &mut r);
                let trigger = Trigger::ALL[r.gen_range(0..Trigger::ALL.len())];
                let delta: f32 = r.gen_range(0.01..0.3);
                profile.adapt(trigger, BehaviorSign::Positive, delta, now, &adaptation);
                now += r.gen_range(0.1..40.0);
            }
            prefs.drift(now, &evolution, &mut r);

            let text = encode_preferences(&prefs).unwrap();
            assert_eq!(decode_preferences(&text, &evolution, &mut rng(), 0.0), prefs);
            let text = encode_personality(&profile).unwrap();
            assert_eq!(decode_personality(&text, &adaptation, &mut rng()), profile);
        }

        let mut metrics = GlobalMetrics::default();
        for _ in 0..17 {
            metrics.record(r.gen_range(0.0..100.0), Some(r.gen_range(1.0..200.0)), true);
        }
        assert_eq!(decode_metrics(&encode_metrics(&metrics).unwrap()), metrics);
    }

    #[test]
    fn corrupt_records_fall_back_to_defaults() {
        let prefs = decode_preferences("{not json", &EvolutionConfig::default(), &mut rng(), 42.0);
        assert!(prefs.scalars_in_range());
        assert!(prefs.history.is_empty());
        assert_eq!(prefs.last_updated, 42.0);

        let profile = decode_personality(r#"{"core_traits": 7}"#, &AdaptationConfig::default(), &mut rng());
        assert!(profile.adaptation_history.is_empty());
        assert!(profile.core_traits.values().all(|t| t.intensity >= 0.2));

        assert_eq!(decode_metrics("[]"), GlobalMetrics::default());
    }

    #[test]
    fn out_of_range_records_are_clamped() {
        let mut prefs = seasoned_preferences();
        prefs.strength = 4.0;
        let text = serde_json::to_string(&prefs).unwrap();
        let decoded = decode_preferences(&text, &EvolutionConfig::default(), &mut rng(), 0.0);
        assert_eq!(decoded.strength, 1.0);
        assert_eq!(decoded.history, prefs.history);
    }

    #[test]
    fn store_round_trip() {
        let mut store = MemoryStore::new();
        let id = CustomerId::from("ivy");
        let prefs = seasoned_preferences();
        let personality = seasoned_personality();
        store_customer(&mut store, &id, &prefs, &personality).unwrap();
        assert_eq!(store.len(), 2);

        let (p, q) = load_customer(&store, &id, &RegistryConfig::default(), &mut rng(), 0.0);
        assert_eq!(p, prefs);
        assert_eq!(q, personality);

        let (fresh, _) = load_customer(&store, &"nobody".into(), &RegistryConfig::default(), &mut rng(), 5.0);
        assert_eq!(fresh.last_updated, 5.0);
    }

    #[test]
    fn metrics_survive_the_store() {
        let mut store = MemoryStore::new();
        assert_eq!(load_metrics(&store), GlobalMetrics::default());
        let mut metrics = GlobalMetrics::default();
        metrics.record(91.0, Some(12.0), true);
        store_metrics(&mut store, &metrics).unwrap();
        assert_eq!(load_metrics(&store), metrics);

        store.store(METRICS_KEY, r#"{"total_interactions": 3}"#.to_string());
        let partial = load_metrics(&store);
        assert_eq!(partial.total_interactions, 3);
        assert_eq!(partial.average_service_time, 60.0);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut registry = CustomerRegistry::with_seed(RegistryConfig::default(), 5);
        let outcome = roast(212.0, 660.0, "arabica", 11.0, &[]);
        for day in 0..4 {
            for name in ["ada", "bo", "cy"] {
                registry.serve(name, &outcome, day as f64 * 24.0 + 8.0);
            }
        }

        let mut save_buffer = Vec::new();
        registry.save(&mut save_buffer).expect("Save failed");

        let mut loaded = CustomerRegistry::with_seed(RegistryConfig::default(), 99);
        loaded.load(&save_buffer[..]).expect("Load failed");

        assert_eq!(loaded.customer_count(), 3);
        assert_eq!(loaded.sim_time, registry.sim_time);
        assert_eq!(loaded.metrics, registry.metrics);
        for id in registry.customer_ids() {
            assert_eq!(loaded.preferences(&id), registry.preferences(&id));
            assert_eq!(loaded.personality(&id), registry.personality(&id));
            assert_eq!(loaded.stats(&id), registry.stats(&id));
        }
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let data = SaveData {
            version: SAVE_VERSION + 1,
            sim_time: 0.0,
            config: RegistryConfig::default(),
            metrics: GlobalMetrics::default(),
            customers: Vec::new(),
        };
        let bytes = bincode::serialize(&data).unwrap();
        match load_registry(&bytes[..]) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, SAVE_VERSION + 1);
            }
            other => panic!("expected version mismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn duplicate_customers_are_rejected() {
        let customer = SerializableCustomer {
            id: "twin".into(),
            preferences: CustomerPreferences::random(&mut rng(), 0.0),
            personality: PersonalityProfile::default(),
            stats: CustomerStats::default(),
        };
        let data = SaveData {
            version: SAVE_VERSION,
            sim_time: 1.0,
            config: RegistryConfig::default(),
            metrics: GlobalMetrics::default(),
            customers: vec![customer.clone(), customer],
        };
        let bytes = bincode::serialize(&data).unwrap();
        let mut registry = CustomerRegistry::with_seed(RegistryConfig::default(), 1);
        registry.add_customer("keeper", 0.0);
        let err = registry.load(&bytes[..]).unwrap_err();
        assert!(matches!(err, SaveError::DuplicateCustomer(_)));
        assert!(err.to_string().contains("twin"));
        assert!(registry.contains(&"keeper".into()));
    }

    #[test]
    fn truncated_snapshot_is_an_error() {
        let registry = CustomerRegistry::with_seed(RegistryConfig::default(), 2);
        let mut bytes = Vec::new();
        registry.save(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        assert!(matches!(load_registry(&bytes[..]), Err(SaveError::Bincode(_))));
    }
}
