//! Labor market: dismissals, job search and matching.
//!
//! Employers post [`Vacancy`] offers on two segments. A searching
//! household samples up to `chi_W` offers on the formal segment (formal
//! firms and the government) and takes the best acceptable one; only when
//! none is acceptable does it repeat the search on the informal segment.
//! Accepting a job removes any previous employment edge first, so a
//! worker never has two employers.

use rand::Rng;
use rand::seq::index;
use tracing::debug;

use dualeco_agents::Household;
use dualeco_types::{Employer, HouseholdId, LaborStatus, Segment};

use crate::error::MarketError;
use crate::relation::Relation;

/// An employer's open positions at its offered wage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vacancy {
    /// Who is hiring.
    pub employer: Employer,
    /// Wage offered.
    pub wage: f64,
    /// Positions still open.
    pub open: u32,
}

/// Outcome of one household's job search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JobSearch {
    /// The household accepted a job.
    Matched {
        /// New employer.
        employer: Employer,
        /// Wage accepted.
        wage: f64,
        /// Segment the job belongs to.
        segment: Segment,
    },
    /// No acceptable offer was sampled.
    Unmatched,
}

/// Vacancy rate: open positions over open plus filled positions.
pub fn vacancy_rate(open: u32, employed: u32) -> f64 {
    let open = f64::from(open);
    let total = open + f64::from(employed);
    if total > 0.0 { open / total } else { 0.0 }
}

/// Sample up to `chi` offers and pick the best acceptable one.
///
/// An offer is acceptable when it has open positions, pays at least the
/// reservation wage and does not come from `current` (the household's
/// own employer). Acceptable offers are sorted by wage (stable, so ties
/// keep sampling order) and the last is taken.
pub fn choose_offer<R: Rng + ?Sized>(
    offers: &[Vacancy],
    reservation_wage: f64,
    current: Option<Employer>,
    chi: u32,
    rng: &mut R,
) -> Option<usize> {
    let amount = usize::try_from(chi).unwrap_or(usize::MAX).min(offers.len());
    if amount == 0 {
        return None;
    }
    let sampled = index::sample(rng, offers.len(), amount);
    best_offer(offers, sampled, reservation_wage, current)
}

/// Pick the best acceptable offer among `sampled` indices, visited in the
/// given order. Ties on wage go to the offer sampled last.
pub fn best_offer(
    offers: &[Vacancy],
    sampled: impl IntoIterator<Item = usize>,
    reservation_wage: f64,
    current: Option<Employer>,
) -> Option<usize> {
    let wage_of = |i: usize| offers.get(i).map_or(0.0, |o| o.wage);
    let mut eligible: Vec<usize> = sampled
        .into_iter()
        .filter(|&i| {
            offers.get(i).is_some_and(|o| {
                o.open > 0 && o.wage >= reservation_wage && Some(o.employer) != current
            })
        })
        .collect();
    eligible.sort_by(|a, b| wage_of(*a).total_cmp(&wage_of(*b)));
    eligible.last().copied()
}

/// Employment relation between households and employers.
#[derive(Debug, Clone, Default)]
pub struct LaborMarket {
    employment: Relation<HouseholdId, Employer>,
}

impl LaborMarket {
    /// Create a market with no employment edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Employ `worker` at `employer`, replacing any previous job.
    pub fn hire(
        &mut self,
        worker: &mut Household,
        employer: Employer,
        status: LaborStatus,
        wage: f64,
    ) -> Option<Employer> {
        let previous = self.employment.link(worker.id, employer);
        worker.hire(employer, status, wage);
        previous
    }

    /// Terminate `worker`'s job, if any.
    pub fn dismiss(&mut self, worker: &mut Household) -> Option<Employer> {
        let previous = self.employment.unlink(worker.id);
        worker.dismiss();
        previous
    }

    /// Employer of a household.
    pub fn employer_of(&self, worker: HouseholdId) -> Option<Employer> {
        self.employment.partner_of(worker)
    }

    /// Workers of an employer, in hiring order.
    pub fn workers_of(&self, employer: Employer) -> &[HouseholdId] {
        self.employment.members_of(employer)
    }

    /// Headcount of an employer.
    pub fn headcount(&self, employer: Employer) -> u32 {
        self.employment.count_of(employer)
    }

    /// Total number of employment edges.
    pub fn employed(&self) -> u32 {
        u32::try_from(self.employment.len()).unwrap_or(u32::MAX)
    }

    /// Dismiss the most recently hired workers until at most `keep`
    /// remain. Entrepreneurs are never dismissed from their own firm.
    pub fn dismiss_surplus(
        &mut self,
        employer: Employer,
        keep: u32,
        households: &mut [Household],
    ) -> Result<Vec<HouseholdId>, MarketError> {
        let mut dismissed = Vec::new();
        let workers: Vec<HouseholdId> = self.workers_of(employer).to_vec();
        let mut headcount = self.headcount(employer);
        for id in workers.into_iter().rev() {
            if headcount <= keep {
                break;
            }
            let worker = households
                .get_mut(id.index())
                .ok_or(MarketError::UnknownHousehold(id))?;
            if worker.status == LaborStatus::Entrepreneur {
                continue;
            }
            self.dismiss(worker);
            dismissed.push(id);
            headcount = headcount.saturating_sub(1);
        }
        if !dismissed.is_empty() {
            debug!(?employer, count = dismissed.len(), "Workers dismissed");
        }
        Ok(dismissed)
    }

    /// Run one household's search: formal segment first, then informal.
    ///
    /// On a match the offer's open positions drop by one and the
    /// household's employer, status and wage are updated.
    pub fn search<R: Rng + ?Sized>(
        &mut self,
        worker: &mut Household,
        formal: &mut [Vacancy],
        informal: &mut [Vacancy],
        chi: u32,
        rng: &mut R,
    ) -> JobSearch {
        for (segment, offers) in [(Segment::Formal, formal), (Segment::Informal, informal)] {
            let Some(choice) = choose_offer(offers, worker.reservation_wage, worker.employer, chi, rng)
            else {
                continue;
            };
            let Some(offer) = offers.get_mut(choice) else {
                continue;
            };
            offer.open = offer.open.saturating_sub(1);
            let status = match (segment, offer.employer) {
                (_, Employer::Government) => LaborStatus::Public,
                (Segment::Formal, Employer::Firm(_)) => LaborStatus::Formal,
                (Segment::Informal, Employer::Firm(_)) => LaborStatus::Informal,
            };
            let (employer, wage) = (offer.employer, offer.wage);
            self.hire(worker, employer, status, wage);
            return JobSearch::Matched {
                employer,
                wage,
                segment,
            };
        }
        JobSearch::Unmatched
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use dualeco_types::FirmId;

    use super::*;

    fn offer(firm: u32, wage: f64) -> Vacancy {
        Vacancy {
            employer: Employer::Firm(FirmId::new(firm)),
            wage,
            open: 1,
        }
    }

    fn unemployed(id: u32, reservation: f64) -> Household {
        Household::new(HouseholdId::new(id), LaborStatus::Unemployed, reservation)
    }

    #[test]
    fn best_formal_offer_wins_and_informal_is_untouched() {
        let mut market = LaborMarket::new();
        let mut formal = vec![offer(0, 1.0), offer(1, 2.0)];
        let mut informal = vec![offer(2, 0.5), offer(3, 1.0)];
        let mut worker = unemployed(0, 1.5);
        let mut rng = SmallRng::seed_from_u64(42);

        let outcome = market.search(&mut worker, &mut formal, &mut informal, 5, &mut rng);
        assert_eq!(
            outcome,
            JobSearch::Matched {
                employer: Employer::Firm(FirmId::new(1)),
                wage: 2.0,
                segment: Segment::Formal,
            }
        );
        assert_eq!(worker.status, LaborStatus::Formal);
        assert_eq!(formal[1].open, 0);
        assert!(informal.iter().all(|o| o.open == 1));
        assert_eq!(market.employer_of(worker.id), Some(Employer::Firm(FirmId::new(1))));
    }

    #[test]
    fn equal_wages_go_to_the_offer_sampled_last() {
        let offers = [offer(0, 1.0), offer(1, 1.0), offer(2, 0.5)];
        assert_eq!(best_offer(&offers, [0, 1, 2], 0.4, None), Some(1));
        assert_eq!(best_offer(&offers, [1, 0, 2], 0.4, None), Some(0));
        assert_eq!(best_offer(&offers, [2, 1, 0], 0.4, None), Some(0));
        // Below the reservation wage nothing is acceptable.
        assert_eq!(best_offer(&offers, [0, 1, 2], 1.5, None), None);
    }

    #[test]
    fn sampled_ties_follow_the_draw_order() {
        let offers = [offer(0, 1.0), offer(1, 1.0), offer(2, 1.0)];
        let order = index::sample(&mut SmallRng::seed_from_u64(5), offers.len(), 3).into_vec();
        let chosen = choose_offer(&offers, 0.5, None, 3, &mut SmallRng::seed_from_u64(5));
        assert_eq!(chosen, order.last().copied());
    }

    #[test]
    fn falls_back_to_the_informal_segment() {
        let mut market = LaborMarket::new();
        let mut formal = vec![offer(0, 0.3)];
        let mut informal = vec![offer(1, 0.5), offer(2, 0.45)];
        let mut worker = unemployed(0, 0.4);
        let mut rng = SmallRng::seed_from_u64(1);

        let outcome = market.search(&mut worker, &mut formal, &mut informal, 5, &mut rng);
        assert!(matches!(
            outcome,
            JobSearch::Matched {
                segment: Segment::Informal,
                wage,
                ..
            } if (wage - 0.5).abs() < 1e-12
        ));
        assert_eq!(worker.status, LaborStatus::Informal);
    }

    #[test]
    fn full_employers_are_skipped() {
        let mut market = LaborMarket::new();
        let mut formal = vec![Vacancy {
            open: 0,
            ..offer(0, 5.0)
        }];
        let mut worker = unemployed(0, 0.4);
        let mut rng = SmallRng::seed_from_u64(3);
        let outcome = market.search(&mut worker, &mut formal, &mut [], 5, &mut rng);
        assert_eq!(outcome, JobSearch::Unmatched);
        assert_eq!(worker.status, LaborStatus::Unemployed);
    }

    #[test]
    fn switching_jobs_removes_the_old_edge() {
        let mut market = LaborMarket::new();
        let mut worker = unemployed(0, 1.0);
        let informal_firm = Employer::Firm(FirmId::new(7));
        market.hire(&mut worker, informal_firm, LaborStatus::Informal, 0.5);
        worker.reservation_wage = 1.0;

        let mut formal = vec![offer(1, 1.2)];
        let mut rng = SmallRng::seed_from_u64(9);
        market.search(&mut worker, &mut formal, &mut [], 3, &mut rng);

        assert!(market.workers_of(informal_firm).is_empty());
        assert_eq!(market.headcount(Employer::Firm(FirmId::new(1))), 1);
        assert_eq!(market.employed(), 1);
    }

    #[test]
    fn dismissal_spares_the_entrepreneur_and_starts_with_latest_hires() {
        let mut market = LaborMarket::new();
        let employer = Employer::Firm(FirmId::new(0));
        let mut households: Vec<Household> = (0..4).map(|i| unemployed(i, 1.0)).collect();
        market.hire(&mut households[0], employer, LaborStatus::Entrepreneur, 1.0);
        for worker in households.iter_mut().skip(1) {
            market.hire(worker, employer, LaborStatus::Formal, 1.0);
        }

        let dismissed = market.dismiss_surplus(employer, 2, &mut households).unwrap();
        assert_eq!(dismissed, vec![HouseholdId::new(3), HouseholdId::new(2)]);

        let dismissed = market.dismiss_surplus(employer, 0, &mut households).unwrap();
        assert_eq!(dismissed, vec![HouseholdId::new(1)]);
        assert_eq!(market.workers_of(employer), &[HouseholdId::new(0)]);
        assert_eq!(households[0].status, LaborStatus::Entrepreneur);
    }

    #[test]
    fn vacancy_rate_handles_empty_markets() {
        assert!(vacancy_rate(0, 0).abs() < 1e-12);
        assert!((vacancy_rate(1, 3) - 0.25).abs() < 1e-12);
    }
}
