//! Route ranking

use std::cmp::Ordering;
use ttv_types::{QuoteError, QuoteResult, RouteInfo};

/// Fill in savings of each alternative relative to the best route
///
/// Savings are never negative and exactly zero for the best route. Call
/// again after any uniform cost change such as the service fee.
pub fn annotate_savings(best: &mut RouteInfo, alternatives: &mut [RouteInfo]) {
	best.breakdown.savings_usd = Some(0.0);
	best.breakdown.savings_percent = Some(0.0);

	let best_cost = best.total_cost_usd();
	for route in alternatives.iter_mut() {
		let total = route.total_cost_usd();
		let savings = (total - best_cost).max(0.0);
		route.breakdown.savings_usd = Some(savings);
		route.breakdown.savings_percent = Some(if total > 0.0 {
			savings / total * 100.0
		} else {
			0.0
		});
	}
}

/// Best route plus ranked alternatives, savings filled in
#[derive(Debug, Clone)]
pub struct RankedRoutes {
	pub best: RouteInfo,
	pub alternatives: Vec<RouteInfo>,
	/// Cost gap between the best route and the runner-up, before truncation
	pub savings_vs_next_usd: f64,
}

#[derive(Debug, Clone)]
pub struct RouteSelector {
	provider_priority: Vec<String>,
	max_alternatives: usize,
}

impl RouteSelector {
	pub fn new(provider_priority: Vec<String>, max_alternatives: usize) -> Self {
		Self {
			provider_priority,
			max_alternatives,
		}
	}

	fn priority(&self, provider_id: &str) -> usize {
		self.provider_priority
			.iter()
			.position(|id| id == provider_id)
			.unwrap_or(self.provider_priority.len())
	}

	/// Total cost ascending, then net output descending, then gas, then configured priority
	fn compare(&self, a: &RouteInfo, b: &RouteInfo) -> Ordering {
		a.breakdown
			.total_cost_usd
			.total_cmp(&b.breakdown.total_cost_usd)
			.then_with(|| {
				b.breakdown
					.net_amount_out_usd
					.total_cmp(&a.breakdown.net_amount_out_usd)
			})
			.then_with(|| a.breakdown.gas_cost_usd.total_cmp(&b.breakdown.gas_cost_usd))
			.then_with(|| self.priority(&a.provider_id).cmp(&self.priority(&b.provider_id)))
	}

	pub fn select(&self, mut routes: Vec<RouteInfo>) -> QuoteResult<RankedRoutes> {
		if routes.is_empty() {
			return Err(QuoteError::NoQuotesAvailable {
				failures: Vec::new(),
			});
		}

		routes.sort_by(|a, b| self.compare(a, b));
		let mut ranked = routes.into_iter();
		let mut best = match ranked.next() {
			Some(best) => best,
			None => {
				return Err(QuoteError::NoQuotesAvailable {
					failures: Vec::new(),
				})
			},
		};
		let mut alternatives: Vec<RouteInfo> = ranked.collect();
		annotate_savings(&mut best, &mut alternatives);

		let savings_vs_next_usd = alternatives
			.first()
			.and_then(|next| next.breakdown.savings_usd)
			.unwrap_or(0.0);

		Ok(RankedRoutes {
			best,
			alternatives: alternatives.into_iter().take(self.max_alternatives).collect(),
			savings_vs_next_usd,
		})
	}
}
