use std::collections::{BTreeSet, HashMap};

use super::{Cell, Direction};

/// Number words by their start square, the way a printed grid is numbered:
/// distinct `(x, y)` starts are visited row by row, left to right, and each
/// gets the next number. Words sharing a start share its number.
///
/// Returns one number per input position, in input order.
pub fn number_starts(xs: &[i32], ys: &[i32]) -> Vec<u32> {
    let starts: BTreeSet<(i32, i32)> = ys.iter().zip(xs).map(|(&y, &x)| (y, x)).collect();
    let numbers: HashMap<(i32, i32), u32> = starts.into_iter().zip(1u32..).collect();

    ys.iter()
        .zip(xs)
        .map(|(&y, &x)| numbers.get(&(y, x)).copied().unwrap_or_default())
        .collect()
}

/// Squares covered by a word of `len` letters starting at column `x`, row `y`.
pub fn word_cells(x: i32, y: i32, len: u32, direction: Direction) -> Vec<Cell> {
    (0..len as i32)
        .map(|i| match direction {
            Direction::Across => Cell { row: y, col: x.saturating_add(i) },
            Direction::Down => Cell { row: y.saturating_add(i), col: x },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_start_shares_number() {
        // across at (0,0), down at (0,0), across at (0,2)
        let numbers = number_starts(&[0, 0, 0], &[0, 0, 2]);
        assert_eq!(numbers, vec![1, 1, 2]);
    }

    #[test]
    fn row_major_order_not_input_order() {
        // (x=3,y=1), (x=0,y=1), (x=5,y=0)
        let numbers = number_starts(&[3, 0, 5], &[1, 1, 0]);
        assert_eq!(numbers, vec![3, 2, 1]);
    }

    #[test]
    fn across_and_down_cells() {
        assert_eq!(
            word_cells(2, 0, 3, Direction::Across),
            vec![
                Cell { row: 0, col: 2 },
                Cell { row: 0, col: 3 },
                Cell { row: 0, col: 4 },
            ]
        );
        assert_eq!(
            word_cells(1, 4, 2, Direction::Down),
            vec![Cell { row: 4, col: 1 }, Cell { row: 5, col: 1 }]
        );
        assert!(word_cells(0, 0, 0, Direction::Down).is_empty());
    }
}
