//! Onslaught token planning
//!
//! Each alliance has a track of sectors, each sector an ordered list of
//! killzones. Tokens spent before the event only advance a track; tokens
//! spent during the event advance it and score the killzone's enemies. The
//! planner splits both pools across up to three tracks to maximise enemies
//! defeated during the event.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::models::{Alliance, Rarity};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Killzone {
    pub total_enemy_count: u32,
    #[serde(default)]
    pub waves: u32,
    #[serde(default)]
    pub total_xp: u32,
    #[serde(default)]
    pub badge_counts_by_rarity: BTreeMap<Rarity, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnslaughtTrack {
    pub sectors: Vec<Vec<Killzone>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OnslaughtData {
    pub tracks: BTreeMap<Alliance, OnslaughtTrack>,
}

impl OnslaughtData {
    pub fn killzone(&self, key: &BattleKey) -> Option<&Killzone> {
        self.tracks.get(&key.track)?.sectors.get(key.sector)?.get(key.zone)
    }
}

/// A single killzone on one track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BattleKey {
    pub track: Alliance,
    pub sector: usize,
    pub zone: usize,
}

/// Token split per track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HsePlan {
    pub pre_event_tokens: BTreeMap<Alliance, u32>,
    pub event_tokens: BTreeMap<Alliance, u32>,
}

impl HsePlan {
    fn empty() -> Self {
        let zeros: BTreeMap<Alliance, u32> = Alliance::ALL.iter().map(|a| (*a, 0)).collect();
        Self {
            pre_event_tokens: zeros.clone(),
            event_tokens: zeros,
        }
    }

    pub fn pre_event(&self, track: Alliance) -> u32 {
        self.pre_event_tokens.get(&track).copied().unwrap_or(0)
    }

    pub fn event(&self, track: Alliance) -> u32 {
        self.event_tokens.get(&track).copied().unwrap_or(0)
    }
}

/// Rewards expected from the during-event battles of one track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackProjection {
    pub track: Option<Alliance>,
    pub battles: u32,
    pub enemies: u32,
    pub xp: u32,
    pub badges: BTreeMap<Rarity, u32>,
}

/// The killzone after `(sector, zone)`: the next one in the sector, else the
/// first of the next non-empty sector, else None at the end of the track.
pub fn get_battle_after(
    data: &OnslaughtData,
    track: Alliance,
    sector: usize,
    zone: usize,
) -> Option<BattleKey> {
    let sectors = &data.tracks.get(&track)?.sectors;
    let current = sectors.get(sector)?;

    if zone + 1 < current.len() {
        return Some(BattleKey {
            track,
            sector,
            zone: zone + 1,
        });
    }
    sectors
        .iter()
        .enumerate()
        .skip(sector + 1)
        .find(|(_, zones)| !zones.is_empty())
        .map(|(sector, _)| BattleKey { track, sector, zone: 0 })
}

fn next_key(data: &OnslaughtData, key: BattleKey) -> Option<BattleKey> {
    get_battle_after(data, key.track, key.sector, key.zone)
}

/// Enemies defeated when `plan` is played from `starts`. A track that runs
/// out of killzones just stops scoring.
pub fn compute_total_enemies(data: &OnslaughtData, plan: &HsePlan, starts: &[BattleKey]) -> u32 {
    starts
        .iter()
        .map(|start| {
            let mut current = data.killzone(start).map(|_| *start);
            for _ in 0..plan.pre_event(start.track) {
                current = current.and_then(|key| next_key(data, key));
            }

            let mut total = 0;
            for _ in 0..plan.event(start.track) {
                let Some(key) = current else {
                    break;
                };
                total += data.killzone(&key).map(|k| k.total_enemy_count).unwrap_or(0);
                current = next_key(data, key);
            }
            total
        })
        .sum()
}

/// Running enemy totals along a track: `prefix[k]` is the sum of the first
/// `k` killzones from the start
#[derive(Debug)]
struct RollingTrack {
    prefix: Vec<u32>,
}

impl RollingTrack {
    fn build(data: &OnslaughtData, start: BattleKey, steps: u32) -> Self {
        let mut prefix = vec![0];
        let mut current = data.killzone(&start).map(|_| start);
        for _ in 0..steps {
            let Some(key) = current else {
                break;
            };
            let enemies = data.killzone(&key).map(|k| k.total_enemy_count).unwrap_or(0);
            prefix.push(prefix[prefix.len() - 1] + enemies);
            current = next_key(data, key);
        }
        Self { prefix }
    }

    fn len(&self) -> usize {
        self.prefix.len() - 1
    }

    /// Enemies in the `take` killzones after skipping `skip`
    fn window(&self, skip: u32, take: u32) -> u32 {
        let end = (skip + take) as usize;
        let start = skip as usize;
        self.prefix[end.min(self.len())] - self.prefix[start.min(self.len())]
    }
}

/// Explicitly constructed over one onslaught table
#[derive(Debug, Clone)]
pub struct OnslaughtPlanner {
    data: OnslaughtData,
}

impl OnslaughtPlanner {
    pub fn new(data: OnslaughtData) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &OnslaughtData {
        &self.data
    }

    /// Split `pre_event` and `event` tokens across the tracks in `starts`
    pub fn plan(&self, starts: &[BattleKey], pre_event: u32, event: u32) -> Result<HsePlan> {
        if starts.is_empty() || starts.len() > 3 {
            return Err(PlannerError::InvalidTrackSelection(format!(
                "expected 1 to 3 tracks, got {}",
                starts.len()
            )));
        }
        for (i, start) in starts.iter().enumerate() {
            if starts[..i].iter().any(|s| s.track == start.track) {
                return Err(PlannerError::InvalidTrackSelection(format!(
                    "{} selected twice",
                    start.track
                )));
            }
            if self.data.killzone(start).is_none() {
                return Err(PlannerError::InvalidTrackSelection(format!(
                    "{} has no killzone at sector {} zone {}",
                    start.track, start.sector, start.zone
                )));
            }
        }

        let rolling: Vec<RollingTrack> = starts
            .iter()
            .map(|s| RollingTrack::build(&self.data, *s, pre_event + event))
            .collect();

        let plan = match starts {
            [a] => self.plan_single(a.track, &rolling[0], event),
            [a, b] => self.plan_pair([a.track, b.track], &rolling, pre_event, event),
            _ => {
                let tracks = [starts[0].track, starts[1].track, starts[2].track];
                self.plan_triple(tracks, &rolling, pre_event, event)
            }
        };
        debug!("Onslaught plan for {} tracks: {:?}", starts.len(), plan);
        Ok(plan)
    }

    /// Best during-event window along one track; the tokens in front of the
    /// window are spent before the event. Earliest window wins ties.
    fn plan_single(&self, track: Alliance, rolling: &RollingTrack, event: u32) -> HsePlan {
        let window = event as usize;
        if window == 0 {
            return HsePlan::empty();
        }
        let mut best: Option<(u32, usize)> = None;

        for i in 0..rolling.len() {
            let total = if i < window {
                rolling.prefix[i + 1]
            } else {
                rolling.prefix[i + 1] - rolling.prefix[i + 1 - window]
            };
            if best.is_none_or(|(b, _)| total > b) {
                best = Some((total, i));
            }
        }

        let mut plan = HsePlan::empty();
        if let Some((_, end)) = best {
            let used = end + 1;
            let during = used.min(window);
            plan.pre_event_tokens.insert(track, (used - during) as u32);
            plan.event_tokens.insert(track, during as u32);
        }
        plan
    }

    fn plan_pair(
        &self,
        tracks: [Alliance; 2],
        rolling: &[RollingTrack],
        pre_event: u32,
        event: u32,
    ) -> HsePlan {
        let spare = Alliance::ALL.into_iter().find(|a| !tracks.contains(a));
        let mut best: Option<(u32, [u32; 4])> = None;

        for pre_a in 0..=pre_event {
            for pre_b in 0..=pre_event - pre_a {
                for event_a in 0..=event {
                    let event_b = event - event_a;
                    let total =
                        rolling[0].window(pre_a, event_a) + rolling[1].window(pre_b, event_b);
                    if best.is_none_or(|(b, _)| total > b) {
                        best = Some((total, [pre_a, pre_b, event_a, event_b]));
                    }
                }
            }
        }

        let mut plan = HsePlan::empty();
        if let Some((_, [pre_a, pre_b, event_a, event_b])) = best {
            plan.pre_event_tokens.insert(tracks[0], pre_a);
            plan.pre_event_tokens.insert(tracks[1], pre_b);
            if let Some(spare) = spare {
                plan.pre_event_tokens.insert(spare, pre_event - pre_a - pre_b);
            }
            plan.event_tokens.insert(tracks[0], event_a);
            plan.event_tokens.insert(tracks[1], event_b);
        }
        plan
    }

    fn plan_triple(
        &self,
        tracks: [Alliance; 3],
        rolling: &[RollingTrack],
        pre_event: u32,
        event: u32,
    ) -> HsePlan {
        let mut best: Option<(u32, [u32; 6])> = None;

        for pre_a in 0..=pre_event {
            for pre_b in 0..=pre_event - pre_a {
                let pre_c = pre_event - pre_a - pre_b;
                for event_a in 0..=event {
                    for event_b in 0..=event - event_a {
                        let event_c = event - event_a - event_b;
                        let total = rolling[0].window(pre_a, event_a)
                            + rolling[1].window(pre_b, event_b)
                            + rolling[2].window(pre_c, event_c);
                        if best.is_none_or(|(b, _)| total > b) {
                            best = Some((total, [pre_a, pre_b, pre_c, event_a, event_b, event_c]));
                        }
                    }
                }
            }
        }

        let mut plan = HsePlan::empty();
        if let Some((_, split)) = best {
            for (i, track) in tracks.iter().enumerate() {
                plan.pre_event_tokens.insert(*track, split[i]);
                plan.event_tokens.insert(*track, split[i + 3]);
            }
        }
        plan
    }

    /// Enemies, XP and badges earned by the during-event battles of `plan`
    pub fn project(&self, plan: &HsePlan, starts: &[BattleKey]) -> Vec<TrackProjection> {
        starts
            .iter()
            .map(|start| {
                let mut projection = TrackProjection {
                    track: Some(start.track),
                    ..Default::default()
                };
                let mut current = self.data.killzone(start).map(|_| *start);
                for _ in 0..plan.pre_event(start.track) {
                    current = current.and_then(|key| next_key(&self.data, key));
                }
                for _ in 0..plan.event(start.track) {
                    let Some(key) = current else {
                        break;
                    };
                    if let Some(zone) = self.data.killzone(&key) {
                        projection.battles += 1;
                        projection.enemies += zone.total_enemy_count;
                        projection.xp += zone.total_xp;
                        for (rarity, count) in &zone.badge_counts_by_rarity {
                            *projection.badges.entry(*rarity).or_default() += count;
                        }
                    }
                    current = next_key(&self.data, key);
                }
                projection
            })
            .collect()
    }
}
