//! The settlement engine.
//!
//! Given the month's shared expenses and the member roster, this module works
//! out what each member should have paid under the household's split policy,
//! how far off they are, and the transfers that even everyone out. It is a
//! pure computation: no database access, no state between calls, and the
//! results are recomputed on every page render rather than stored.

use std::collections::HashMap;

use crate::{
    expense::Expense,
    group::{Household, Member, MemberId},
};

/// How shared costs are divided between members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitPolicy {
    /// The member bearing `holder_percent` of shared costs. Only honored when
    /// the roster has exactly two members; otherwise costs are split evenly.
    pub ratio_holder: Option<MemberId>,
    /// The ratio holder's share as a percentage in [0, 100].
    pub holder_percent: u8,
}

impl SplitPolicy {
    /// An even split between all members.
    pub fn even() -> Self {
        Self {
            ratio_holder: None,
            holder_percent: 50,
        }
    }

    /// The policy configured on `household`, or an even split when no
    /// household has been set up.
    pub fn from_household(household: Option<&Household>) -> Self {
        match household {
            Some(household) => Self {
                ratio_holder: household.ratio_holder_id,
                holder_percent: household.split_ratio,
            },
            None => Self::even(),
        }
    }
}

/// A two-way division of a total between the ratio holder and their partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSplit {
    /// The ratio holder's share in whole yen.
    pub holder_share: i64,
    /// The partner's share in whole yen.
    pub partner_share: i64,
    /// The yen lost to flooring before redistribution (0 or 1 for
    /// complementary integer percentages).
    pub remainder: i64,
}

/// One member's standing for the month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberBalance {
    /// The member this balance belongs to.
    pub member_id: MemberId,
    /// The member's display name, with the unnamed fallback already applied.
    pub display_name: String,
    /// How much the member actually paid.
    pub paid: i64,
    /// How much the member should have paid under the split policy.
    pub target: i64,
    /// `paid - target`. Positive means the member is owed money.
    pub balance: i64,
}

/// A directed instruction: `from` pays `to` `amount` yen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    /// The member who pays.
    pub from: MemberId,
    /// The member who receives.
    pub to: MemberId,
    /// The amount in whole yen. Always positive.
    pub amount: i64,
}

/// The engine's output: balances for display and the transfer plan.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettlementPlan {
    /// Per-member balances, largest creditor first.
    pub balances: Vec<MemberBalance>,
    /// The transfers that zero out the balances.
    pub transfers: Vec<Transfer>,
}

/// Divide `total` between the ratio holder (`holder_percent`) and their
/// partner (`100 - holder_percent`).
///
/// Both shares are floored, so up to one yen can go missing; it is handed
/// whole to whichever side has the larger percentage, the holder winning ties.
/// The shares therefore always sum to exactly `total`.
pub fn split_with_ratio(total: i64, holder_percent: u8) -> PairSplit {
    let holder_percent = i64::from(holder_percent);
    let partner_percent = 100 - holder_percent;

    let mut holder_share = total * holder_percent / 100;
    let mut partner_share = total * partner_percent / 100;

    let remainder = total - holder_share - partner_share;

    if remainder > 0 {
        if holder_percent >= partner_percent {
            holder_share += remainder;
        } else {
            partner_share += remainder;
        }
    }

    PairSplit {
        holder_share,
        partner_share,
        remainder,
    }
}

/// Compute each member's balance and the transfers that settle the month.
///
/// The custom ratio only applies to a two-member roster whose ratio holder is
/// on it; every other configuration splits evenly at `floor(total / n)` per
/// member. The even split does not hand its flooring remainder to anyone, so
/// with an odd total the balances do not quite sum to zero — longstanding
/// behavior that the couples flow never hits and that existing settlement
/// suggestions depend on.
///
/// Expenses whose payer is not on the roster contribute nothing (they belong
/// to members who have since been removed). An empty roster yields an empty
/// plan.
pub fn settle(expenses: &[Expense], members: &[Member], policy: SplitPolicy) -> SettlementPlan {
    if members.is_empty() {
        return SettlementPlan::default();
    }

    let total: i64 = expenses.iter().map(|expense| expense.amount).sum();

    let mut paid_by_member: HashMap<MemberId, i64> =
        members.iter().map(|member| (member.id, 0)).collect();

    for expense in expenses {
        if let Some(paid) = paid_by_member.get_mut(&expense.payer_id) {
            *paid += expense.amount;
        }
    }

    let pair_ratio_holder = policy.ratio_holder.filter(|holder| {
        members.len() == 2 && members.iter().any(|member| member.id == *holder)
    });

    let targets: Vec<i64> = match pair_ratio_holder {
        Some(holder) => {
            let split = split_with_ratio(total, policy.holder_percent);

            members
                .iter()
                .map(|member| {
                    if member.id == holder {
                        split.holder_share
                    } else {
                        split.partner_share
                    }
                })
                .collect()
        }
        None => {
            let share = total / members.len() as i64;
            vec![share; members.len()]
        }
    };

    let mut balances: Vec<MemberBalance> = members
        .iter()
        .zip(targets)
        .map(|(member, target)| {
            let paid = paid_by_member[&member.id];

            MemberBalance {
                member_id: member.id,
                display_name: member.display_name().to_string(),
                paid,
                target,
                balance: paid - target,
            }
        })
        .collect();

    // Stable sort: members with equal balances keep their roster order.
    balances.sort_by(|a, b| b.balance.cmp(&a.balance));

    let transfers = match balances.len() {
        2 => pair_transfer(&balances),
        n if n > 2 => greedy_transfers(&balances),
        _ => Vec::new(),
    };

    SettlementPlan {
        balances,
        transfers,
    }
}

/// The two-member shortcut: a single transfer of the whole positive balance.
///
/// `balances` must be sorted descending, so a non-trivial month always has
/// the creditor first and the debtor second.
fn pair_transfer(balances: &[MemberBalance]) -> Vec<Transfer> {
    if balances[0].balance > 0 && balances[1].balance < 0 {
        vec![Transfer {
            from: balances[1].member_id,
            to: balances[0].member_id,
            amount: balances[0].balance,
        }]
    } else {
        Vec::new()
    }
}

/// Greedy matching for rosters of three or more.
///
/// Creditors and debtors are each taken largest first, and each step moves as
/// much as the smaller side allows. This yields at most `creditors + debtors
/// - 1` transfers. It is not guaranteed to be the minimum possible edge count,
/// but it is deterministic, and its suggestions are what members have been
/// paying each other; a provably optimal matcher would change them.
fn greedy_transfers(balances: &[MemberBalance]) -> Vec<Transfer> {
    let mut receivers: Vec<(MemberId, i64)> = balances
        .iter()
        .filter(|balance| balance.balance > 0)
        .map(|balance| (balance.member_id, balance.balance))
        .collect();

    let mut payers: Vec<(MemberId, i64)> = balances
        .iter()
        .filter(|balance| balance.balance < 0)
        .map(|balance| (balance.member_id, -balance.balance))
        .collect();

    receivers.sort_by(|a, b| b.1.cmp(&a.1));
    payers.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < receivers.len() && j < payers.len() {
        let amount = receivers[i].1.min(payers[j].1);

        if amount > 0 {
            transfers.push(Transfer {
                from: payers[j].0,
                to: receivers[i].0,
                amount,
            });
        }

        receivers[i].1 -= amount;
        payers[j].1 -= amount;

        if receivers[i].1 == 0 {
            i += 1;
        }
        if payers[j].1 == 0 {
            j += 1;
        }
    }

    transfers
}

#[cfg(test)]
mod split_with_ratio_tests {
    use super::{PairSplit, split_with_ratio};

    #[test]
    fn even_total_splits_cleanly() {
        assert_eq!(
            split_with_ratio(100, 50),
            PairSplit {
                holder_share: 50,
                partner_share: 50,
                remainder: 0
            }
        );
    }

    #[test]
    fn tied_percentages_give_the_odd_yen_to_the_holder() {
        assert_eq!(
            split_with_ratio(101, 50),
            PairSplit {
                holder_share: 51,
                partner_share: 50,
                remainder: 1
            }
        );
    }

    #[test]
    fn larger_holder_percentage_takes_the_remainder() {
        assert_eq!(
            split_with_ratio(100, 60),
            PairSplit {
                holder_share: 60,
                partner_share: 40,
                remainder: 0
            }
        );
        assert_eq!(
            split_with_ratio(101, 60),
            PairSplit {
                holder_share: 61,
                partner_share: 40,
                remainder: 1
            }
        );
    }

    #[test]
    fn larger_partner_percentage_takes_the_remainder() {
        assert_eq!(
            split_with_ratio(101, 30),
            PairSplit {
                holder_share: 30,
                partner_share: 71,
                remainder: 1
            }
        );
    }

    #[test]
    fn zero_total_gives_zero_shares() {
        assert_eq!(
            split_with_ratio(0, 70),
            PairSplit {
                holder_share: 0,
                partner_share: 0,
                remainder: 0
            }
        );
    }

    #[test]
    fn extreme_percentages_assign_everything_to_one_side() {
        assert_eq!(
            split_with_ratio(1234, 100),
            PairSplit {
                holder_share: 1234,
                partner_share: 0,
                remainder: 0
            }
        );
        assert_eq!(
            split_with_ratio(1234, 0),
            PairSplit {
                holder_share: 0,
                partner_share: 1234,
                remainder: 0
            }
        );
    }

    #[test]
    fn shares_always_sum_to_the_total() {
        for total in 0..=500 {
            for percent in 0..=100u8 {
                let split = split_with_ratio(total, percent);

                assert_eq!(
                    split.holder_share + split.partner_share,
                    total,
                    "split of {total} at {percent}% lost money"
                );
                assert!(split.holder_share >= 0);
                assert!(split.partner_share >= 0);
            }
        }
    }
}

#[cfg(test)]
mod settle_tests {
    use time::macros::date;

    use crate::{
        expense::{Category, Expense},
        group::Member,
    };

    use super::{SplitPolicy, Transfer, settle};

    fn member(id: i64, name: &str) -> Member {
        Member {
            id,
            name: Some(name.to_string()),
        }
    }

    fn expense(amount: i64, payer_id: i64) -> Expense {
        Expense {
            id: 0,
            amount,
            date: date!(2025 - 08 - 05),
            category: Category::Food,
            description: None,
            shop: None,
            payer_id,
        }
    }

    fn ratio_policy(holder: i64, percent: u8) -> SplitPolicy {
        SplitPolicy {
            ratio_holder: Some(holder),
            holder_percent: percent,
        }
    }

    #[test]
    fn two_members_even_split_single_transfer() {
        let members = [member(1, "Aki"), member(2, "Ben")];
        let expenses = [expense(3000, 1), expense(1000, 2)];

        let plan = settle(&expenses, &members, ratio_policy(1, 50));

        assert_eq!(plan.balances.len(), 2);
        assert_eq!(plan.balances[0].member_id, 1);
        assert_eq!(plan.balances[0].paid, 3000);
        assert_eq!(plan.balances[0].target, 2000);
        assert_eq!(plan.balances[0].balance, 1000);
        assert_eq!(plan.balances[1].balance, -1000);

        assert_eq!(
            plan.transfers,
            vec![Transfer {
                from: 2,
                to: 1,
                amount: 1000
            }]
        );
    }

    #[test]
    fn two_members_custom_ratio() {
        let members = [member(1, "Aki"), member(2, "Ben")];
        let expenses = [expense(3000, 1), expense(1000, 2)];

        let plan = settle(&expenses, &members, ratio_policy(1, 70));

        assert_eq!(plan.balances[0].target, 2800);
        assert_eq!(plan.balances[1].target, 1200);
        assert_eq!(plan.balances[0].balance, 200);
        assert_eq!(plan.balances[1].balance, -200);

        assert_eq!(
            plan.transfers,
            vec![Transfer {
                from: 2,
                to: 1,
                amount: 200
            }]
        );
    }

    #[test]
    fn balanced_members_need_no_transfers() {
        let members = [member(1, "Aki"), member(2, "Ben")];
        let expenses = [expense(2000, 1), expense(2000, 2)];

        let plan = settle(&expenses, &members, ratio_policy(1, 50));

        assert!(plan.transfers.is_empty());
        assert!(plan.balances.iter().all(|balance| balance.balance == 0));
    }

    #[test]
    fn two_person_balances_sum_to_zero() {
        let members = [member(1, "Aki"), member(2, "Ben")];
        let expenses = [expense(101, 1), expense(33, 2)];

        for percent in [0u8, 30, 50, 67, 100] {
            let plan = settle(&expenses, &members, ratio_policy(1, percent));
            let sum: i64 = plan.balances.iter().map(|balance| balance.balance).sum();

            assert_eq!(sum, 0, "balances did not cancel at {percent}%");
        }
    }

    #[test]
    fn no_expenses_means_all_zero() {
        let members = [member(1, "Aki"), member(2, "Ben")];

        let plan = settle(&[], &members, ratio_policy(1, 70));

        assert!(plan.transfers.is_empty());
        for balance in &plan.balances {
            assert_eq!(balance.paid, 0);
            assert_eq!(balance.target, 0);
            assert_eq!(balance.balance, 0);
        }
    }

    #[test]
    fn no_members_means_empty_plan() {
        let plan = settle(&[expense(1000, 1)], &[], SplitPolicy::even());

        assert!(plan.balances.is_empty());
        assert!(plan.transfers.is_empty());
    }

    #[test]
    fn single_member_gets_no_transfers() {
        let members = [member(1, "Aki")];

        let plan = settle(&[expense(1000, 1)], &members, SplitPolicy::even());

        assert_eq!(plan.balances.len(), 1);
        assert_eq!(plan.balances[0].paid, 1000);
        assert_eq!(plan.balances[0].target, 1000);
        assert!(plan.transfers.is_empty());
    }

    #[test]
    fn three_members_greedy_matches_largest_debtor_first() {
        let members = [member(1, "Aki"), member(2, "Ben"), member(3, "Cho")];
        let expenses = [expense(900, 1), expense(300, 2)];

        let plan = settle(&expenses, &members, SplitPolicy::even());

        assert_eq!(plan.balances[0].balance, 500);
        assert_eq!(plan.balances[1].balance, -100);
        assert_eq!(plan.balances[2].balance, -400);

        assert_eq!(
            plan.transfers,
            vec![
                Transfer {
                    from: 3,
                    to: 1,
                    amount: 400
                },
                Transfer {
                    from: 2,
                    to: 1,
                    amount: 100
                },
            ]
        );
    }

    #[test]
    fn greedy_transfers_zero_out_every_balance() {
        let members = [
            member(1, "Aki"),
            member(2, "Ben"),
            member(3, "Cho"),
            member(4, "Dai"),
        ];
        let expenses = [
            expense(10_000, 1),
            expense(6_000, 2),
            expense(2_000, 3),
            expense(0, 4),
        ];

        let plan = settle(&expenses, &members, SplitPolicy::even());

        let mut net: std::collections::HashMap<i64, i64> = plan
            .balances
            .iter()
            .map(|balance| (balance.member_id, balance.balance))
            .collect();

        for transfer in &plan.transfers {
            assert!(transfer.amount > 0);
            *net.get_mut(&transfer.from).unwrap() += transfer.amount;
            *net.get_mut(&transfer.to).unwrap() -= transfer.amount;
        }

        assert!(net.values().all(|remaining| *remaining == 0));
        assert!(plan.transfers.len() <= plan.balances.len() - 1);
    }

    #[test]
    fn even_split_keeps_its_flooring_remainder() {
        let members = [member(1, "Aki"), member(2, "Ben"), member(3, "Cho")];
        let expenses = [expense(100, 1)];

        let plan = settle(&expenses, &members, SplitPolicy::even());

        for balance in &plan.balances {
            assert_eq!(balance.target, 33);
        }

        let sum: i64 = plan.balances.iter().map(|balance| balance.balance).sum();
        assert_eq!(sum, 1);
    }

    #[test]
    fn odd_total_without_ratio_holder_transfers_the_full_positive_balance() {
        // The even split floors each target to 50, so the creditor is owed 51
        // while the debtor only owes 50. The transfer follows the creditor.
        let members = [member(1, "Aki"), member(2, "Ben")];
        let expenses = [expense(101, 1)];

        let plan = settle(&expenses, &members, SplitPolicy::even());

        assert_eq!(
            plan.transfers,
            vec![Transfer {
                from: 2,
                to: 1,
                amount: 51
            }]
        );
    }

    #[test]
    fn expenses_from_removed_members_are_ignored() {
        let members = [member(1, "Aki"), member(2, "Ben")];
        let expenses = [expense(3000, 1), expense(9999, 42)];

        let plan = settle(&expenses, &members, ratio_policy(1, 50));

        // The stranger's 9999 still inflates the total being split, but
        // nobody gets credit for having paid it.
        assert_eq!(plan.balances[0].paid, 3000);
        assert_eq!(plan.balances[1].paid, 0);
        assert_eq!(plan.balances[0].target + plan.balances[1].target, 12_999);
    }

    #[test]
    fn ratio_holder_off_the_roster_falls_back_to_even_split() {
        let members = [member(1, "Aki"), member(2, "Ben")];
        let expenses = [expense(1000, 1)];

        let plan = settle(&expenses, &members, ratio_policy(42, 90));

        assert_eq!(plan.balances[0].target, 500);
        assert_eq!(plan.balances[1].target, 500);
    }

    #[test]
    fn unnamed_members_get_the_fallback_label() {
        let members = [Member { id: 1, name: None }, member(2, "Ben")];

        let plan = settle(&[], &members, SplitPolicy::even());

        assert!(
            plan.balances
                .iter()
                .any(|balance| balance.display_name == "Unnamed")
        );
    }

    #[test]
    fn balances_are_sorted_largest_creditor_first() {
        let members = [member(1, "Aki"), member(2, "Ben"), member(3, "Cho")];
        let expenses = [expense(100, 2), expense(700, 3)];

        let plan = settle(&expenses, &members, SplitPolicy::even());

        let order: Vec<i64> = plan
            .balances
            .iter()
            .map(|balance| balance.balance)
            .collect();
        let mut sorted = order.clone();
        sorted.sort_by(|a, b| b.cmp(a));

        assert_eq!(order, sorted);
        assert_eq!(plan.balances[0].member_id, 3);
    }

    #[test]
    fn repeated_calls_give_identical_results() {
        let members = [member(1, "Aki"), member(2, "Ben"), member(3, "Cho")];
        let expenses = [expense(900, 1), expense(300, 2), expense(450, 3)];
        let policy = SplitPolicy::even();

        let first = settle(&expenses, &members, policy);
        let second = settle(&expenses, &members, policy);

        assert_eq!(first, second);
        // The returned balances reflect paid/target, not the greedy working
        // state that was walked down to zero.
        assert!(first.balances.iter().any(|balance| balance.balance != 0));
    }
}
