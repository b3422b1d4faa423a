//! Split calculator
//!
//! Turns an expense amount, a split method and the participants' inputs into
//! one allocation per participant. The calculation is pure: nothing is read
//! from or written to storage, and the same input always yields the same
//! output. Persisting the result is the caller's job.
//!
//! All arithmetic is done in integer cents. Where a division does not come
//! out even, the leftover cents are handed out in participant order so the
//! allocations always add up to the expense amount exactly. Amounts and
//! shares are capped at `Money::MAX`, and sums are checked, so no input can
//! overflow the cent arithmetic.

use std::collections::HashSet;

use crate::error::{SplitError, SplitTotal};
use crate::models::{Allocation, Money, ParticipantInput, Percentage, SplitMethod};

/// Compute (or validate) each participant's share of `amount`
///
/// Returns one allocation per input, in input order. On error nothing is
/// returned, so a caller can never persist a partial split.
pub fn compute_allocations(
    amount: Money,
    method: SplitMethod,
    participants: &[ParticipantInput],
) -> Result<Vec<Allocation>, SplitError> {
    if !amount.is_positive() {
        return Err(SplitError::NonPositiveAmount(amount));
    }
    if !amount.is_within_limit() {
        return Err(SplitError::AmountTooLarge(amount));
    }
    if participants.is_empty() {
        return Err(SplitError::EmptyParticipantList);
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for input in participants {
        if !seen.insert(input.participant_id) {
            return Err(SplitError::DuplicateParticipant(input.participant_id));
        }
    }

    match method {
        SplitMethod::Equal => split_equal(amount, participants),
        SplitMethod::Exact => split_exact(amount, participants),
        SplitMethod::Percentage => split_percentage(amount, participants),
    }
}

fn split_equal(
    amount: Money,
    participants: &[ParticipantInput],
) -> Result<Vec<Allocation>, SplitError> {
    for input in participants {
        if input.amount_owed.is_some() || input.percentage_owed.is_some() {
            return Err(invalid_input(
                SplitMethod::Equal,
                input,
                "equal splits take neither an amount nor a percentage",
            ));
        }
    }

    let count = participants.len() as i64;
    let share = div_round_half_up(amount.cents(), count);
    let mut shares = vec![share; participants.len()];
    distribute_remainder(&mut shares, amount.cents() - share * count, |_| true);

    Ok(participants
        .iter()
        .zip(shares)
        .map(|(input, cents)| Allocation::new(input.participant_id, Money::from_cents(cents)))
        .collect())
}

fn split_exact(
    amount: Money,
    participants: &[ParticipantInput],
) -> Result<Vec<Allocation>, SplitError> {
    let mut allocations = Vec::with_capacity(participants.len());

    for input in participants {
        if input.percentage_owed.is_some() {
            return Err(invalid_input(
                SplitMethod::Exact,
                input,
                "exact splits take an amount, not a percentage",
            ));
        }
        let owed = input.amount_owed.ok_or_else(|| {
            invalid_input(SplitMethod::Exact, input, "an amount owed is required")
        })?;
        if owed.is_negative() {
            return Err(invalid_input(
                SplitMethod::Exact,
                input,
                "amount owed cannot be negative",
            ));
        }
        if !owed.is_within_limit() {
            return Err(SplitError::AmountTooLarge(owed));
        }
        allocations.push(Allocation::new(input.participant_id, owed));
    }

    let total = Money::checked_sum(allocations.iter().filter_map(|a| a.amount_owed))
        .ok_or(SplitError::TotalOverflow)?;
    if total != amount {
        return Err(SplitError::SplitMismatch {
            expected: SplitTotal::Amount(amount),
            actual: SplitTotal::Amount(total),
        });
    }

    Ok(allocations)
}

fn split_percentage(
    amount: Money,
    participants: &[ParticipantInput],
) -> Result<Vec<Allocation>, SplitError> {
    let mut percentages = Vec::with_capacity(participants.len());

    for input in participants {
        if input.amount_owed.is_some() {
            return Err(invalid_input(
                SplitMethod::Percentage,
                input,
                "percentage splits take a percentage, not an amount",
            ));
        }
        let pct = input.percentage_owed.ok_or_else(|| {
            invalid_input(SplitMethod::Percentage, input, "a percentage owed is required")
        })?;
        if !pct.is_valid_share() {
            return Err(invalid_input(
                SplitMethod::Percentage,
                input,
                "percentage must be between 0 and 100",
            ));
        }
        percentages.push(pct);
    }

    let total: Percentage = percentages.iter().copied().sum();
    if total != Percentage::HUNDRED {
        return Err(SplitError::SplitMismatch {
            expected: SplitTotal::Percent(Percentage::HUNDRED),
            actual: SplitTotal::Percent(total),
        });
    }

    let mut shares: Vec<i64> = percentages
        .iter()
        .map(|pct| pct.share_of(amount).cents())
        .collect();
    let assigned: i64 = shares.iter().sum();
    distribute_remainder(&mut shares, amount.cents() - assigned, |i| {
        !percentages[i].is_zero()
    });

    Ok(participants
        .iter()
        .zip(percentages)
        .zip(shares)
        .map(|((input, pct), cents)| {
            Allocation::with_percentage(input.participant_id, Money::from_cents(cents), pct)
        })
        .collect())
}

/// Spread `remainder` cents over `shares`, one cent per participant
///
/// A positive remainder goes to the first eligible participants in list
/// order; a negative one is taken from the last eligible participants that
/// still have something to give. Rounding half-up keeps `|remainder|` below
/// the number of eligible participants, so every cent finds a home.
fn distribute_remainder<F>(shares: &mut [i64], remainder: i64, eligible: F)
where
    F: Fn(usize) -> bool,
{
    if remainder > 0 {
        let targets: Vec<usize> = (0..shares.len())
            .filter(|&i| eligible(i))
            .take(remainder as usize)
            .collect();
        for i in targets {
            shares[i] += 1;
        }
    } else if remainder < 0 {
        let targets: Vec<usize> = (0..shares.len())
            .rev()
            .filter(|&i| eligible(i) && shares[i] > 0)
            .take(remainder.unsigned_abs() as usize)
            .collect();
        for i in targets {
            shares[i] -= 1;
        }
    }
}

/// `numerator / denominator` rounded half-up, for non-negative numerators
///
/// Works from the quotient and remainder so it cannot overflow for any
/// `numerator`.
fn div_round_half_up(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder >= denominator - remainder {
        quotient + 1
    } else {
        quotient
    }
}

fn invalid_input(method: SplitMethod, input: &ParticipantInput, reason: &str) -> SplitError {
    SplitError::InvalidInputForMethod {
        method,
        participant_id: input.participant_id,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserId;

    fn users(n: usize) -> Vec<UserId> {
        (0..n).map(|_| UserId::new()).collect()
    }

    fn cents(allocations: &[Allocation]) -> Vec<i64> {
        allocations
            .iter()
            .map(|a| a.amount_owed.unwrap().cents())
            .collect()
    }

    fn equal_inputs(ids: &[UserId]) -> Vec<ParticipantInput> {
        ids.iter().map(|&id| ParticipantInput::equal(id)).collect()
    }

    fn exact_inputs(ids: &[UserId], amounts: &[i64]) -> Vec<ParticipantInput> {
        ids.iter()
            .zip(amounts)
            .map(|(&id, &c)| ParticipantInput::exact(id, Money::from_cents(c)))
            .collect()
    }

    fn percentage_inputs(ids: &[UserId], hundredths: &[i64]) -> Vec<ParticipantInput> {
        ids.iter()
            .zip(hundredths)
            .map(|(&id, &h)| ParticipantInput::percentage(id, Percentage::from_hundredths(h)))
            .collect()
    }

    #[test]
    fn test_equal_split_assigns_remainder_in_order() {
        let ids = users(3);
        let result =
            compute_allocations(Money::from_cents(10000), SplitMethod::Equal, &equal_inputs(&ids))
                .unwrap();

        assert_eq!(cents(&result), vec![3334, 3333, 3333]);
        assert_eq!(
            result.iter().map(|a| a.participant_id).collect::<Vec<_>>(),
            ids
        );
        assert!(result.iter().all(|a| a.percentage_owed.is_none()));
    }

    #[test]
    fn test_equal_split_when_rounding_overshoots() {
        // 0.05 / 2 = 0.025 rounds up to 0.03, so one cent comes back off the end
        let ids = users(2);
        let result =
            compute_allocations(Money::from_cents(5), SplitMethod::Equal, &equal_inputs(&ids))
                .unwrap();
        assert_eq!(cents(&result), vec![3, 2]);

        // 0.02 / 3 = 0.0067 rounds up to 0.01, one cent comes back
        let ids = users(3);
        let result =
            compute_allocations(Money::from_cents(2), SplitMethod::Equal, &equal_inputs(&ids))
                .unwrap();
        assert_eq!(cents(&result), vec![1, 1, 0]);
    }

    #[test]
    fn test_equal_split_properties() {
        for amount in [1, 2, 7, 99, 100, 1001, 9999, 10000, 123457] {
            for count in 1..=9 {
                let ids = users(count);
                let result = compute_allocations(
                    Money::from_cents(amount),
                    SplitMethod::Equal,
                    &equal_inputs(&ids),
                )
                .unwrap();
                let shares = cents(&result);

                assert_eq!(shares.iter().sum::<i64>(), amount, "{} / {}", amount, count);
                let max = shares.iter().max().unwrap();
                let min = shares.iter().min().unwrap();
                assert!(max - min <= 1, "{} / {} -> {:?}", amount, count, shares);
                assert!(shares.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn test_equal_split_rejects_amounts_and_percentages() {
        let ids = users(2);
        let mut inputs = equal_inputs(&ids);
        inputs[1].amount_owed = Some(Money::from_cents(500));

        let err = compute_allocations(Money::from_cents(1000), SplitMethod::Equal, &inputs)
            .unwrap_err();
        assert!(matches!(
            err,
            SplitError::InvalidInputForMethod { method: SplitMethod::Equal, participant_id, .. }
                if participant_id == ids[1]
        ));

        let mut inputs = equal_inputs(&ids);
        inputs[0].percentage_owed = Some(Percentage::from_whole(50));
        assert!(matches!(
            compute_allocations(Money::from_cents(1000), SplitMethod::Equal, &inputs),
            Err(SplitError::InvalidInputForMethod { .. })
        ));
    }

    #[test]
    fn test_exact_split_accepted_unchanged() {
        let ids = users(3);
        let inputs = exact_inputs(&ids, &[3000, 3000, 3000]);
        let result =
            compute_allocations(Money::from_cents(9000), SplitMethod::Exact, &inputs).unwrap();

        assert_eq!(result.len(), inputs.len());
        for (allocation, input) in result.iter().zip(&inputs) {
            assert_eq!(allocation.participant_id, input.participant_id);
            assert_eq!(allocation.amount_owed, input.amount_owed);
            assert_eq!(allocation.percentage_owed, None);
        }
    }

    #[test]
    fn test_exact_split_mismatch_reports_totals() {
        let ids = users(3);
        let inputs = exact_inputs(&ids, &[4000, 3000, 3000]);
        let err =
            compute_allocations(Money::from_cents(9000), SplitMethod::Exact, &inputs).unwrap_err();

        assert_eq!(
            err,
            SplitError::SplitMismatch {
                expected: SplitTotal::Amount(Money::from_cents(9000)),
                actual: SplitTotal::Amount(Money::from_cents(10000)),
            }
        );
        assert_eq!(err.mismatch_delta(), Some(1000));
    }

    #[test]
    fn test_exact_split_input_checks() {
        let ids = users(2);

        let mut inputs = exact_inputs(&ids, &[500, 500]);
        inputs[0].amount_owed = None;
        assert!(matches!(
            compute_allocations(Money::from_cents(1000), SplitMethod::Exact, &inputs),
            Err(SplitError::InvalidInputForMethod { method: SplitMethod::Exact, .. })
        ));

        let inputs = exact_inputs(&ids, &[1500, -500]);
        assert!(matches!(
            compute_allocations(Money::from_cents(1000), SplitMethod::Exact, &inputs),
            Err(SplitError::InvalidInputForMethod { .. })
        ));

        let mut inputs = exact_inputs(&ids, &[500, 500]);
        inputs[1].percentage_owed = Some(Percentage::from_whole(50));
        assert!(matches!(
            compute_allocations(Money::from_cents(1000), SplitMethod::Exact, &inputs),
            Err(SplitError::InvalidInputForMethod { .. })
        ));
    }

    #[test]
    fn test_exact_split_allows_zero_share() {
        let ids = users(2);
        let inputs = exact_inputs(&ids, &[1000, 0]);
        let result =
            compute_allocations(Money::from_cents(1000), SplitMethod::Exact, &inputs).unwrap();
        assert_eq!(cents(&result), vec![1000, 0]);
    }

    #[test]
    fn test_percentage_split() {
        let ids = users(3);
        let inputs = percentage_inputs(&ids, &[5000, 3000, 2000]);
        let result =
            compute_allocations(Money::from_cents(20000), SplitMethod::Percentage, &inputs)
                .unwrap();

        assert_eq!(cents(&result), vec![10000, 6000, 4000]);
        let pct_total: Percentage = result.iter().filter_map(|a| a.percentage_owed).sum();
        assert_eq!(pct_total, Percentage::HUNDRED);
    }

    #[test]
    fn test_percentage_split_mismatch() {
        let ids = users(3);
        let inputs = percentage_inputs(&ids, &[6000, 3000, 2000]);
        let err = compute_allocations(Money::from_cents(20000), SplitMethod::Percentage, &inputs)
            .unwrap_err();

        assert_eq!(
            err,
            SplitError::SplitMismatch {
                expected: SplitTotal::Percent(Percentage::HUNDRED),
                actual: SplitTotal::Percent(Percentage::from_whole(110)),
            }
        );
    }

    #[test]
    fn test_percentage_split_distributes_rounding() {
        // Thirds of 100.00: 33.34 + 33.33 + 33.33 = 100.00
        let ids = users(3);
        let inputs = percentage_inputs(&ids, &[3334, 3333, 3333]);
        let result =
            compute_allocations(Money::from_cents(10000), SplitMethod::Percentage, &inputs)
                .unwrap();
        assert_eq!(cents(&result).iter().sum::<i64>(), 10000);

        // 50% of 0.01 rounds up twice; one cent is taken back from the last
        let ids = users(2);
        let inputs = percentage_inputs(&ids, &[5000, 5000]);
        let result =
            compute_allocations(Money::from_cents(1), SplitMethod::Percentage, &inputs).unwrap();
        assert_eq!(cents(&result), vec![1, 0]);
    }

    #[test]
    fn test_percentage_split_properties() {
        let splits: &[&[i64]] = &[
            &[3333, 3333, 3334],
            &[2500, 2500, 2500, 2500],
            &[1, 9999],
            &[1429, 1429, 1428, 1428, 1429, 1429, 1428],
            &[0, 5000, 0, 5000],
            &[10000],
        ];
        for amount in [1, 3, 17, 999, 10001, 33333, 1234567] {
            for hundredths in splits {
                let ids = users(hundredths.len());
                let inputs = percentage_inputs(&ids, hundredths);
                let result = compute_allocations(
                    Money::from_cents(amount),
                    SplitMethod::Percentage,
                    &inputs,
                )
                .unwrap();
                let shares = cents(&result);

                assert_eq!(shares.iter().sum::<i64>(), amount, "{} {:?}", amount, hundredths);
                assert!(shares.iter().all(|&c| c >= 0));
                for (share, &pct) in shares.iter().zip(hundredths.iter()) {
                    if pct == 0 {
                        assert_eq!(*share, 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_percentage_split_input_checks() {
        let ids = users(2);

        let mut inputs = percentage_inputs(&ids, &[5000, 5000]);
        inputs[1].percentage_owed = None;
        assert!(matches!(
            compute_allocations(Money::from_cents(1000), SplitMethod::Percentage, &inputs),
            Err(SplitError::InvalidInputForMethod { method: SplitMethod::Percentage, .. })
        ));

        let mut inputs = percentage_inputs(&ids, &[5000, 5000]);
        inputs[0].amount_owed = Some(Money::from_cents(500));
        assert!(matches!(
            compute_allocations(Money::from_cents(1000), SplitMethod::Percentage, &inputs),
            Err(SplitError::InvalidInputForMethod { .. })
        ));

        let inputs = percentage_inputs(&ids, &[15000, -5000]);
        assert!(matches!(
            compute_allocations(Money::from_cents(1000), SplitMethod::Percentage, &inputs),
            Err(SplitError::InvalidInputForMethod { .. })
        ));
    }

    #[test]
    fn test_common_validation() {
        let ids = users(2);

        assert_eq!(
            compute_allocations(Money::zero(), SplitMethod::Equal, &equal_inputs(&ids)),
            Err(SplitError::NonPositiveAmount(Money::zero()))
        );
        assert_eq!(
            compute_allocations(Money::from_cents(-100), SplitMethod::Equal, &equal_inputs(&ids)),
            Err(SplitError::NonPositiveAmount(Money::from_cents(-100)))
        );
        assert_eq!(
            compute_allocations(Money::from_cents(100), SplitMethod::Exact, &[]),
            Err(SplitError::EmptyParticipantList)
        );

        let dup = vec![ParticipantInput::equal(ids[0]), ParticipantInput::equal(ids[0])];
        assert_eq!(
            compute_allocations(Money::from_cents(100), SplitMethod::Equal, &dup),
            Err(SplitError::DuplicateParticipant(ids[0]))
        );
    }

    #[test]
    fn test_idempotent() {
        let ids = users(7);
        let inputs = equal_inputs(&ids);
        let first = compute_allocations(Money::from_cents(10001), SplitMethod::Equal, &inputs);
        let second = compute_allocations(Money::from_cents(10001), SplitMethod::Equal, &inputs);
        assert_eq!(first, second);

        let inputs = percentage_inputs(&ids[..3], &[3333, 3333, 3334]);
        let first = compute_allocations(Money::from_cents(999), SplitMethod::Percentage, &inputs);
        let second = compute_allocations(Money::from_cents(999), SplitMethod::Percentage, &inputs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_div_round_half_up() {
        assert_eq!(div_round_half_up(10000, 3), 3333);
        assert_eq!(div_round_half_up(5, 2), 3);
        assert_eq!(div_round_half_up(2, 3), 1);
        assert_eq!(div_round_half_up(1, 3), 0);
        assert_eq!(div_round_half_up(i64::MAX, 2), i64::MAX / 2 + 1);
        assert_eq!(div_round_half_up(i64::MAX, 1), i64::MAX);
    }

    #[test]
    fn test_amount_limit() {
        let ids = users(2);

        // largest allowed amount splits cleanly
        let result = compute_allocations(Money::MAX, SplitMethod::Equal, &equal_inputs(&ids))
            .unwrap();
        assert_eq!(cents(&result), vec![5_000_000_000, 4_999_999_999]);

        let too_big = Money::from_cents(Money::MAX.cents() + 1);
        assert_eq!(
            compute_allocations(too_big, SplitMethod::Equal, &equal_inputs(&ids)),
            Err(SplitError::AmountTooLarge(too_big))
        );

        let huge = Money::from_cents(i64::MAX);
        assert_eq!(
            compute_allocations(huge, SplitMethod::Equal, &equal_inputs(&ids)),
            Err(SplitError::AmountTooLarge(huge))
        );
        let inputs = percentage_inputs(&ids, &[5000, 5000]);
        assert_eq!(
            compute_allocations(huge, SplitMethod::Percentage, &inputs),
            Err(SplitError::AmountTooLarge(huge))
        );
    }

    #[test]
    fn test_exact_shares_cannot_wrap_around() {
        // shares that would wrap an i64 back round to the amount
        let ids = users(3);
        let inputs = exact_inputs(&ids, &[i64::MAX / 2 + 1, i64::MAX / 2 + 1, 102]);
        assert_eq!(
            compute_allocations(Money::from_cents(100), SplitMethod::Exact, &inputs),
            Err(SplitError::AmountTooLarge(Money::from_cents(i64::MAX / 2 + 1)))
        );

        // shares at the cap are accepted individually but still must add up
        let inputs = exact_inputs(&ids, &[Money::MAX.cents(), Money::MAX.cents(), 0]);
        let err = compute_allocations(Money::MAX, SplitMethod::Exact, &inputs).unwrap_err();
        assert_eq!(
            err,
            SplitError::SplitMismatch {
                expected: SplitTotal::Amount(Money::MAX),
                actual: SplitTotal::Amount(Money::from_cents(2 * Money::MAX.cents())),
            }
        );

        let inputs = exact_inputs(&ids, &[Money::MAX.cents() - 1, 1, 0]);
        let result = compute_allocations(Money::MAX, SplitMethod::Exact, &inputs).unwrap();
        assert_eq!(cents(&result).iter().sum::<i64>(), Money::MAX.cents());
    }

    #[test]
    fn test_percentage_split_at_limit() {
        let ids = users(3);
        let inputs = percentage_inputs(&ids, &[3333, 3333, 3334]);
        let result = compute_allocations(Money::MAX, SplitMethod::Percentage, &inputs).unwrap();
        assert_eq!(cents(&result).iter().sum::<i64>(), Money::MAX.cents());
    }
}
