//! Customer registry - main entry point for serving and learning

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;
use roastery_logic::personality::{BehaviorSign, InteractionContext, PersonalityProfile};
use roastery_logic::preferences::{CustomerPreferences, ServedCoffee};
use roastery_logic::quality::RoastOutcome;
use roastery_logic::satisfaction::evaluate_scored;

use crate::components::*;
use crate::config::RegistryConfig;
use crate::learning::*;
use crate::persistence::SaveError;
use crate::systems::*;

/// Every customer of the shop, as entities in an ECS world.
pub struct CustomerRegistry {
    /// ECS world containing all customers
    pub world: World,
    /// Latest simulation hour seen
    pub sim_time: f64,
    pub metrics: GlobalMetrics,
    pub config: RegistryConfig,
    index: HashMap<CustomerId, Entity>,
    rng: StdRng,
}

/// Everything one interaction needs besides the customer.
struct Feedback<'a> {
    satisfaction: f64,
    served: Option<&'a ServedCoffee>,
    /// Counts as a visit (a cup was handed over).
    visit: bool,
    ignored: bool,
    response_seconds: Option<f64>,
}

impl CustomerRegistry {
    /// Empty registry with default tuning and an entropy-seeded RNG.
    pub fn new() -> Self {
        Self::with_rng(RegistryConfig::default(), StdRng::from_entropy())
    }

    /// Empty registry whose random choices are reproducible.
    pub fn with_seed(config: RegistryConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: RegistryConfig, rng: StdRng) -> Self {
        Self {
            world: World::new(),
            sim_time: 0.0,
            metrics: GlobalMetrics::default(),
            config,
            index: HashMap::new(),
            rng,
        }
    }

    fn observe(&mut self, now: f64) {
        if now > self.sim_time {
            self.sim_time = now;
        }
    }

    /// Look up a customer, creating one with random taste and personality
    /// if they are new.
    pub fn add_customer(&mut self, id: impl Into<CustomerId>, now: f64) -> Entity {
        let id = id.into();
        if let Some(&entity) = self.index.get(&id) {
            return entity;
        }

        let prefs = CustomerPreferences::random(&mut self.rng, now);
        let personality = PersonalityProfile::random(&mut self.rng, &self.config.adaptation);
        log::info!(
            "new customer {}: likes {} {}, traits {:?}",
            id,
            prefs.roast.name(),
            prefs.flavor.name(),
            personality.dominant_traits()
        );
        let entity = self
            .world
            .spawn((id.clone(), prefs, personality, CustomerStats::default()));
        self.index.insert(id, entity);
        self.observe(now);
        entity
    }

    /// Insert a fully specified customer.
    pub fn insert_customer(
        &mut self,
        id: CustomerId,
        preferences: CustomerPreferences,
        personality: PersonalityProfile,
        stats: CustomerStats,
    ) -> Result<Entity, SaveError> {
        if self.index.contains_key(&id) {
            return Err(SaveError::DuplicateCustomer(id));
        }
        let entity = self
            .world
            .spawn((id.clone(), preferences, personality, stats));
        self.index.insert(id, entity);
        Ok(entity)
    }

    pub fn remove_customer(&mut self, id: &CustomerId) -> bool {
        match self.index.remove(id) {
            Some(entity) => self.world.despawn(entity).is_ok(),
            None => false,
        }
    }

    pub fn contains(&self, id: &CustomerId) -> bool {
        self.index.contains_key(id)
    }

    pub fn customer_count(&self) -> usize {
        self.index.len()
    }

    /// All customer ids, sorted.
    pub fn customer_ids(&self) -> Vec<CustomerId> {
        let mut ids: Vec<CustomerId> = self.index.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn entity(&self, id: &CustomerId) -> Option<Entity> {
        self.index.get(id).copied()
    }

    pub fn preferences(&self, id: &CustomerId) -> Option<CustomerPreferences> {
        let entity = self.entity(id)?;
        self.world
            .get::<&CustomerPreferences>(entity)
            .ok()
            .map(|p| (*p).clone())
    }

    pub fn personality(&self, id: &CustomerId) -> Option<PersonalityProfile> {
        let entity = self.entity(id)?;
        self.world
            .get::<&PersonalityProfile>(entity)
            .ok()
            .map(|p| (*p).clone())
    }

    pub fn stats(&self, id: &CustomerId) -> Option<CustomerStats> {
        let entity = self.entity(id)?;
        self.world
            .get::<&CustomerStats>(entity)
            .ok()
            .map(|s| (*s).clone())
    }

    /// Serve a roasted cup: score it against the customer's taste and
    /// personality, then let both learn from it.
    pub fn serve(&mut self, id: impl Into<CustomerId>, outcome: &RoastOutcome, now: f64) -> ServiceReport {
        let id = id.into();
        let entity = self.add_customer(id.clone(), now);
        let served = ServedCoffee::from_outcome(outcome);

        let satisfaction = match self
            .world
            .query_one_mut::<(&CustomerPreferences, &PersonalityProfile)>(entity)
        {
            Ok((prefs, personality)) => {
                evaluate_scored(&outcome.profile, f64::from(outcome.quality), prefs, personality)
            }
            Err(_) => 0.0,
        };

        self.apply_feedback(
            id,
            entity,
            Feedback {
                satisfaction,
                served: Some(&served),
                visit: true,
                ignored: false,
                response_seconds: None,
            },
            now,
        )
    }

    /// Record a non-roasting interaction (or a cup scored elsewhere).
    pub fn record_interaction(
        &mut self,
        id: impl Into<CustomerId>,
        event: &InteractionEvent,
        context: &InteractionContext,
        now: f64,
    ) -> ServiceReport {
        let id = id.into();
        let entity = self.add_customer(id.clone(), now);
        let satisfaction = event_satisfaction(event, context);
        let served = match event {
            InteractionEvent::CoffeeServed { served, .. } => served.as_ref(),
            _ => None,
        };

        self.apply_feedback(
            id,
            entity,
            Feedback {
                satisfaction,
                served,
                visit: matches!(event, InteractionEvent::CoffeeServed { .. }),
                ignored: matches!(event, InteractionEvent::Ignored),
                response_seconds: event.response_seconds(),
            },
            now,
        )
    }

    fn apply_feedback(
        &mut self,
        id: CustomerId,
        entity: Entity,
        feedback: Feedback<'_>,
        now: f64,
    ) -> ServiceReport {
        self.observe(now);
        let satisfaction = feedback.satisfaction;
        let config = &self.config;
        let rng = &mut self.rng;

        let mut report = ServiceReport {
            customer: id.clone(),
            satisfaction,
            mood: CustomerMood::from_satisfaction(satisfaction),
            loyalty: 0.0,
            visits: 0,
            triggers: Vec::new(),
            adaptations: Vec::new(),
            preference_shift: Default::default(),
        };

        let Ok((prefs, personality, stats)) = self.world.query_one_mut::<(
            &mut CustomerPreferences,
            &mut PersonalityProfile,
            &mut CustomerStats,
        )>(entity) else {
            log::warn!("customer {} has no learning components", id);
            return report;
        };

        let flavor_before = prefs.flavor;
        if let Some(served) = feedback.served {
            report.preference_shift = prefs.evolve(served, satisfaction, now, &config.evolution, rng);
            if report.preference_shift.is_categorical() {
                log::debug!(
                    "{} now prefers {} {}",
                    id,
                    prefs.roast.name(),
                    prefs.flavor.name()
                );
            }
        }
        if feedback.visit {
            stats.visits += 1;
        }

        if feedback.ignored {
            stats.ignored_streak += 1;
        } else {
            stats.ignored_streak = 0;
        }
        let returning = stats.visits > 1;
        stats.last_seen = Some(now);
        stats.push_satisfaction(satisfaction, config.trigger_window.max(1));
        stats.adjust_loyalty(loyalty_delta(satisfaction, config));

        report.triggers = derive_triggers(
            stats,
            satisfaction,
            feedback.served,
            feedback.served.map(|_| flavor_before),
            config,
        );
        for &trigger in &report.triggers {
            if personality.adapt(
                trigger,
                BehaviorSign::Positive,
                config.trigger_delta,
                now,
                &config.adaptation,
            ) {
                log::debug!("{} adapted to {}", id, trigger);
                report.adaptations.push(trigger);
            }
        }

        report.loyalty = stats.loyalty;
        report.visits = stats.visits;
        self.metrics
            .record(satisfaction, feedback.response_seconds, returning);
        report
    }

    /// Advance to `now`: refresh moods for `context` and run natural drift.
    ///
    /// Returns how many customers drifted.
    pub fn update(&mut self, now: f64, context: &InteractionContext) -> usize {
        self.observe(now);
        mood_system(&mut self.world, context);
        drift_system(&mut self.world, now, &self.config.evolution, &mut self.rng)
    }

    pub fn analytics(&self, id: &CustomerId) -> Option<CustomerAnalytics> {
        let entity = self.entity(id)?;
        let mut query = self
            .world
            .query_one::<(&CustomerPreferences, &PersonalityProfile, &CustomerStats)>(entity)
            .ok()?;
        let (prefs, personality, stats) = query.get()?;
        Some(CustomerAnalytics {
            id: id.clone(),
            visits: stats.visits,
            loyalty: stats.loyalty,
            mood: stats.latest_satisfaction().map(CustomerMood::from_satisfaction),
            average_satisfaction: prefs.average_satisfaction(),
            preferences: prefs.clone(),
            dominant_traits: personality.dominant_traits(),
            adaptations: personality.adaptation_history.len(),
        })
    }

    /// Analytics for every customer, sorted by id.
    pub fn all_analytics(&self) -> Vec<CustomerAnalytics> {
        self.customer_ids()
            .iter()
            .filter_map(|id| self.analytics(id))
            .collect()
    }

    pub fn insights(&self) -> PlayerInsights {
        let mut query = self.world.query::<(&CustomerId, &CustomerStats)>();
        let customers = query
            .iter()
            .map(|(_, (id, stats))| (id, stats.loyalty, stats.visits));
        PlayerInsights::generate(&self.metrics, customers)
    }

    /// Forget every customer and all metrics.
    pub fn reset(&mut self) {
        self.world.clear();
        self.index.clear();
        self.metrics = GlobalMetrics::default();
        log::info!("registry reset");
    }

    /// Save registry state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        crate::persistence::save_registry(writer, self)
    }

    /// Load registry state from a reader, replacing every customer
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = crate::persistence::load_registry(reader)?;

        let mut restored = Self::with_rng(loaded.config, self.rng.clone());
        restored.sim_time = loaded.sim_time;
        restored.metrics = loaded.metrics;
        for customer in loaded.customers {
            restored.insert_customer(
                customer.id,
                customer.preferences,
                customer.personality,
                customer.stats,
            )?;
        }
        log::info!(
            "loaded {} customers at hour {:.1}",
            restored.customer_count(),
            restored.sim_time
        );
        *self = restored;
        Ok(())
    }
}

impl Default for CustomerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
