//! Balance aggregation
//!
//! `BalanceLedger` derives every user's paid/owed totals and pairwise
//! balances from a read-only snapshot of expenses in a single pass.
//! `BalanceService` feeds it the current contents of storage.
//!
//! Sign convention: a positive balance means others owe this user; a
//! negative one means this user owes others.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::{ShareError, ShareResult, SplitError};
use crate::models::{Expense, Money, UserId};
use crate::storage::Storage;

/// Paid/owed figures for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub user_id: UserId,
    /// Sum of expense amounts this user paid
    pub total_paid: Money,
    /// Sum of this user's allocations, including their share of their own expenses
    pub total_owed: Money,
    /// `total_paid - total_owed`
    pub net_balance: Money,
    /// Net balance against each other user; zero entries are kept
    pub counterparty_balances: BTreeMap<UserId, Money>,
}

impl UserSummary {
    /// An all-zero summary
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            total_paid: Money::zero(),
            total_owed: Money::zero(),
            net_balance: Money::zero(),
            counterparty_balances: BTreeMap::new(),
        }
    }

    /// Counterparty balances with zero entries filtered out
    pub fn nonzero_counterparties(&self) -> impl Iterator<Item = (&UserId, &Money)> {
        self.counterparty_balances
            .iter()
            .filter(|(_, balance)| !balance.is_zero())
    }

    /// Balance against a single counterparty (zero if they never shared an expense)
    pub fn balance_with(&self, other: UserId) -> Money {
        self.counterparty_balances
            .get(&other)
            .copied()
            .unwrap_or_default()
    }
}

/// Aggregated balances over a snapshot of expenses
#[derive(Debug, Clone, Default)]
pub struct BalanceLedger {
    paid: HashMap<UserId, Money>,
    owed: HashMap<UserId, Money>,
    /// `net[a][b]`: what `b` owes `a`, net of what `a` owes `b`
    net: HashMap<UserId, BTreeMap<UserId, Money>>,
    system_total: Money,
    expense_count: usize,
}

impl BalanceLedger {
    /// Build the ledger from a snapshot
    ///
    /// Fails with `IncompleteAllocation` if any allocation lacks its computed
    /// amount; such a snapshot is corrupt and no figure derived from it is
    /// trustworthy. Amounts above `Money::MAX` (only possible in a hand-edited
    /// data file) and totals that would overflow are rejected the same way.
    pub fn build(expenses: &[Expense]) -> Result<Self, SplitError> {
        let mut ledger = Self::default();

        for expense in expenses {
            let payer = expense.payer_id;
            let amount = bounded(expense.amount)?;
            accumulate(ledger.paid.entry(payer).or_default(), amount)?;
            accumulate(&mut ledger.system_total, amount)?;
            ledger.expense_count += 1;

            for allocation in &expense.allocations {
                let participant = allocation.participant_id;
                let owed = allocation
                    .amount_owed
                    .ok_or(SplitError::IncompleteAllocation {
                        expense_id: expense.id,
                        participant_id: participant,
                    })
                    .and_then(bounded)?;

                accumulate(ledger.owed.entry(participant).or_default(), owed)?;

                if participant != payer {
                    let to_payer = ledger
                        .net
                        .entry(payer)
                        .or_default()
                        .entry(participant)
                        .or_default();
                    accumulate(to_payer, owed)?;

                    let from_participant = ledger
                        .net
                        .entry(participant)
                        .or_default()
                        .entry(payer)
                        .or_default();
                    accumulate(from_participant, -owed)?;
                }
            }
        }

        tracing::debug!(
            expenses = ledger.expense_count,
            users = ledger.known_users().len(),
            "balance ledger built"
        );

        Ok(ledger)
    }

    /// Summary for a single user; all zeros if they appear nowhere
    pub fn user_summary(&self, user_id: UserId) -> UserSummary {
        let total_paid = self.paid.get(&user_id).copied().unwrap_or_default();
        let total_owed = self.owed.get(&user_id).copied().unwrap_or_default();

        UserSummary {
            user_id,
            total_paid,
            total_owed,
            net_balance: total_paid - total_owed,
            counterparty_balances: self.net.get(&user_id).cloned().unwrap_or_default(),
        }
    }

    /// One summary per user, in the order given
    pub fn all_user_summaries(&self, users: &[UserId]) -> Vec<UserSummary> {
        users.iter().map(|&id| self.user_summary(id)).collect()
    }

    /// Sum of all expense amounts
    pub fn system_total(&self) -> Money {
        self.system_total
    }

    /// Number of expenses aggregated
    pub fn expense_count(&self) -> usize {
        self.expense_count
    }

    /// Every user who paid or participated in at least one expense, ordered by id
    pub fn known_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .paid
            .keys()
            .chain(self.owed.keys())
            .copied()
            .collect();
        users.sort();
        users.dedup();
        users
    }
}

fn bounded(amount: Money) -> Result<Money, SplitError> {
    if amount.is_within_limit() {
        Ok(amount)
    } else {
        Err(SplitError::AmountTooLarge(amount))
    }
}

fn accumulate(total: &mut Money, amount: Money) -> Result<(), SplitError> {
    *total = total
        .checked_add(amount)
        .ok_or(SplitError::TotalOverflow)?;
    Ok(())
}

/// Service for balance reporting over the stored expenses
pub struct BalanceService<'a> {
    storage: &'a Storage,
}

impl<'a> BalanceService<'a> {
    /// Create a new balance service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Build a ledger from the current expense snapshot
    pub fn ledger(&self) -> ShareResult<BalanceLedger> {
        let expenses = self.storage.expenses.get_all()?;
        BalanceLedger::build(&expenses).map_err(|e| {
            tracing::error!(error = %e, "stored expenses failed aggregation");
            ShareError::from(e)
        })
    }

    /// Summary for one registered user
    pub fn user_summary(&self, user_id: UserId) -> ShareResult<UserSummary> {
        self.storage
            .users
            .get(user_id)?
            .ok_or_else(|| ShareError::user_not_found(user_id.to_string()))?;
        Ok(self.ledger()?.user_summary(user_id))
    }

    /// Summaries for all registered users, ordered by username
    pub fn all_user_summaries(&self) -> ShareResult<Vec<UserSummary>> {
        let users: Vec<UserId> = self
            .storage
            .users
            .get_all()?
            .into_iter()
            .map(|u| u.id)
            .collect();
        Ok(self.ledger()?.all_user_summaries(&users))
    }

    /// Sum of all stored expense amounts
    pub fn system_total(&self) -> ShareResult<Money> {
        Ok(self.ledger()?.system_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SplitSharePaths;
    use crate::models::{Allocation, ParticipantInput, SplitMethod, User};
    use crate::services::split::compute_allocations;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn expense(
        payer: UserId,
        amount: i64,
        method: SplitMethod,
        inputs: &[ParticipantInput],
    ) -> Expense {
        let mut expense = Expense::new(
            "Test",
            Money::from_cents(amount),
            NaiveDate::from_ymd_opt(2024, 7, 29).unwrap(),
            method,
            payer,
        );
        let allocations = compute_allocations(expense.amount, method, inputs).unwrap();
        expense.set_allocations(allocations);
        expense
    }

    fn equal(payer: UserId, amount: i64, participants: &[UserId]) -> Expense {
        let inputs: Vec<_> = participants
            .iter()
            .map(|&id| ParticipantInput::equal(id))
            .collect();
        expense(payer, amount, SplitMethod::Equal, &inputs)
    }

    #[test]
    fn test_single_expense_summary() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let ledger = BalanceLedger::build(&[equal(a, 9000, &[a, b, c])]).unwrap();

        let sa = ledger.user_summary(a);
        assert_eq!(sa.total_paid, Money::from_cents(9000));
        assert_eq!(sa.total_owed, Money::from_cents(3000));
        assert_eq!(sa.net_balance, Money::from_cents(6000));
        assert_eq!(sa.balance_with(b), Money::from_cents(3000));
        assert_eq!(sa.balance_with(c), Money::from_cents(3000));
        assert!(!sa.counterparty_balances.contains_key(&a));

        let sb = ledger.user_summary(b);
        assert_eq!(sb.total_paid, Money::zero());
        assert_eq!(sb.total_owed, Money::from_cents(3000));
        assert_eq!(sb.net_balance, Money::from_cents(-3000));
        assert_eq!(sb.balance_with(a), Money::from_cents(-3000));
        assert_eq!(sb.balance_with(c), Money::zero());
    }

    #[test]
    fn test_offsetting_expenses_net_out() {
        let (a, b) = (UserId::new(), UserId::new());
        let ledger = BalanceLedger::build(&[
            equal(a, 2000, &[a, b]),
            equal(b, 2000, &[a, b]),
        ])
        .unwrap();

        let sa = ledger.user_summary(a);
        assert_eq!(sa.counterparty_balances.get(&b), Some(&Money::zero()));
        assert_eq!(sa.nonzero_counterparties().count(), 0);
        assert_eq!(sa.net_balance, Money::zero());
    }

    #[test]
    fn test_payer_not_participating() {
        let (a, b, c) = (UserId::new(), UserId::new(), UserId::new());
        let inputs = vec![
            ParticipantInput::exact(b, Money::from_cents(700)),
            ParticipantInput::exact(c, Money::from_cents(300)),
        ];
        let ledger =
            BalanceLedger::build(&[expense(a, 1000, SplitMethod::Exact, &inputs)]).unwrap();

        let sa = ledger.user_summary(a);
        assert_eq!(sa.total_owed, Money::zero());
        assert_eq!(sa.net_balance, Money::from_cents(1000));
        assert_eq!(sa.balance_with(b), Money::from_cents(700));
        assert_eq!(sa.balance_with(c), Money::from_cents(300));
    }

    #[test]
    fn test_summary_invariants() {
        let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();
        let (a, b, c, d) = (users[0], users[1], users[2], users[3]);
        let expenses = vec![
            equal(a, 10000, &[a, b, c]),
            equal(b, 4501, &[a, b, c, d]),
            expense(
                c,
                20000,
                SplitMethod::Percentage,
                &[
                    ParticipantInput::percentage(a, crate::models::Percentage::from_whole(50)),
                    ParticipantInput::percentage(c, crate::models::Percentage::from_whole(30)),
                    ParticipantInput::percentage(d, crate::models::Percentage::from_whole(20)),
                ],
            ),
            equal(d, 333, &[b]),
        ];
        let ledger = BalanceLedger::build(&expenses).unwrap();
        let summaries = ledger.all_user_summaries(&users);

        for summary in &summaries {
            assert_eq!(summary.net_balance, summary.total_paid - summary.total_owed);
            assert!(!summary.counterparty_balances.contains_key(&summary.user_id));
        }

        for x in &summaries {
            for y in &summaries {
                if x.user_id != y.user_id {
                    assert_eq!(x.balance_with(y.user_id), -y.balance_with(x.user_id));
                }
            }
        }

        let net_total: Money = summaries.iter().map(|s| s.net_balance).sum();
        assert_eq!(net_total, Money::zero());
        assert_eq!(ledger.system_total(), Money::from_cents(10000 + 4501 + 20000 + 333));
        assert_eq!(ledger.expense_count(), 4);
    }

    #[test]
    fn test_unknown_user_is_all_zero() {
        let (a, b) = (UserId::new(), UserId::new());
        let ledger = BalanceLedger::build(&[equal(a, 1000, &[a])]).unwrap();

        let summary = ledger.user_summary(b);
        assert_eq!(summary, UserSummary::empty(b));

        let empty = BalanceLedger::build(&[]).unwrap();
        assert_eq!(empty.user_summary(a), UserSummary::empty(a));
        assert_eq!(empty.system_total(), Money::zero());
    }

    #[test]
    fn test_incomplete_allocation_is_surfaced() {
        let (a, b) = (UserId::new(), UserId::new());
        let mut broken = equal(a, 1000, &[a, b]);
        broken.allocations[1] = Allocation {
            participant_id: b,
            amount_owed: None,
            percentage_owed: None,
        };

        let err = BalanceLedger::build(&[broken.clone()]).unwrap_err();
        assert_eq!(
            err,
            SplitError::IncompleteAllocation {
                expense_id: broken.id,
                participant_id: b,
            }
        );
    }

    #[test]
    fn test_out_of_range_amounts_are_surfaced() {
        let (a, b) = (UserId::new(), UserId::new());

        // a hand-edited file with amounts that would wrap the totals
        let mut tampered = equal(a, 1000, &[a, b]);
        tampered.amount = Money::from_cents(i64::MAX);
        tampered.allocations[1].amount_owed = Some(Money::from_cents(i64::MAX));
        let err = BalanceLedger::build(&[tampered.clone(), tampered]).unwrap_err();
        assert_eq!(err, SplitError::AmountTooLarge(Money::from_cents(i64::MAX)));

        let mut tampered = equal(a, 1000, &[a, b]);
        tampered.allocations[1].amount_owed = Some(Money::from_cents(-i64::MAX));
        assert!(matches!(
            BalanceLedger::build(&[tampered]),
            Err(SplitError::AmountTooLarge(_))
        ));

        // the largest legal amounts aggregate without trouble
        let big = equal(a, Money::MAX.cents(), &[a, b]);
        let ledger = BalanceLedger::build(&[big.clone(), big]).unwrap();
        assert_eq!(ledger.system_total().cents(), 2 * Money::MAX.cents());
        assert_eq!(
            ledger.user_summary(b).balance_with(a),
            -ledger.user_summary(a).balance_with(b)
        );
    }

    #[test]
    fn test_summaries_follow_caller_order() {
        let (a, b) = (UserId::new(), UserId::new());
        let ledger = BalanceLedger::build(&[equal(a, 1000, &[a, b])]).unwrap();

        let ids: Vec<_> = ledger
            .all_user_summaries(&[b, a])
            .into_iter()
            .map(|s| s.user_id)
            .collect();
        assert_eq!(ids, vec![b, a]);

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ledger.known_users(), expected);
    }

    #[test]
    fn test_service_requires_known_user() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitSharePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let user = User::new("alice", "1234567890");
        storage.users.upsert(user.clone()).unwrap();

        let service = BalanceService::new(&storage);
        let summary = service.user_summary(user.id).unwrap();
        assert_eq!(summary, UserSummary::empty(user.id));
        assert_eq!(service.system_total().unwrap(), Money::zero());

        let err = service.user_summary(UserId::new()).unwrap_err();
        assert!(err.is_not_found());
    }
}
