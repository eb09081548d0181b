//! An independent SAT check on what the deduction loop concludes.
//!
//! Statements are encoded as exactly-k cardinality constraints over one boolean
//! per cell (`true` meaning mine) and handed to `varisat`. Nothing here is used
//! while playing; it exists to audit the solver against the board.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

use crate::{Constraint, Point};

/// Cardinality constraints up to this many literals are expanded clause by
/// clause; larger ones go through a sequential counter.
const NAIVE_LIMIT: usize = 10;

/// What every model of a set of statements says about one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeducedState {
    ForcedMine,
    ForcedSafe,
    Undetermined,
}

struct Encoding {
    solver: Solver<'static>,
    vars: BTreeMap<Point, Var>,
}

impl Encoding {
    fn new<'a>(statements: impl IntoIterator<Item = &'a Constraint>) -> Self {
        let mut encoding = Encoding {
            solver: Solver::new(),
            vars: BTreeMap::new(),
        };
        for statement in statements {
            encoding.add(statement.cells(), statement.mine_count());
        }
        encoding
    }

    fn mine(&mut self, point: Point) -> Lit {
        let var = match self.vars.get(&point) {
            Some(&var) => var,
            None => {
                let var = self.solver.new_var();
                self.vars.insert(point, var);
                var
            }
        };
        Lit::from_var(var, true)
    }

    fn add(&mut self, cells: &BTreeSet<Point>, mine_count: i32) {
        let lits: Vec<Lit> = cells.iter().map(|&cell| self.mine(cell)).collect();

        let mut formula = CnfFormula::new();
        match usize::try_from(mine_count) {
            Ok(k) => exactly(&mut formula, &mut self.solver, &lits, k),
            // No assignment has a negative number of mines.
            Err(_) => formula.add_clause(&[]),
        }
        self.solver.add_formula(&formula);
    }

    fn satisfiable_with(&mut self, assumptions: &[Lit]) -> anyhow::Result<bool> {
        self.solver.assume(assumptions);
        let result = self.solver.solve();
        self.solver.assume(&[]);
        Ok(result?)
    }
}

/// Whether some mine assignment satisfies every statement.
pub fn is_consistent(statements: &[Constraint]) -> anyhow::Result<bool> {
    Encoding::new(statements).satisfiable_with(&[])
}

/// Whether every assignment satisfying `statements` also satisfies `candidate`.
///
/// Checked by ruling out each other count the candidate's cells could hold.
/// Anything follows from inconsistent statements.
pub fn entails(statements: &[Constraint], candidate: &Constraint) -> anyhow::Result<bool> {
    for k in 0..=candidate.len() {
        if i32::try_from(k).is_ok_and(|k| k == candidate.mine_count()) {
            continue;
        }

        let mut encoding = Encoding::new(statements);
        encoding.add(candidate.cells(), k as i32);
        if encoding.satisfiable_with(&[])? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The forced state of every cell mentioned by `statements`.
pub fn deduce(statements: &[Constraint]) -> anyhow::Result<BTreeMap<Point, DeducedState>> {
    let mut encoding = Encoding::new(statements);
    if !encoding.satisfiable_with(&[])? {
        anyhow::bail!("statements are inconsistent");
    }

    let vars: Vec<(Point, Var)> = encoding.vars.iter().map(|(&p, &v)| (p, v)).collect();
    let mut deductions = BTreeMap::new();

    for (point, var) in vars {
        let mine_possible = encoding.satisfiable_with(&[Lit::from_var(var, true)])?;
        let safe_possible = encoding.satisfiable_with(&[Lit::from_var(var, false)])?;

        let state = match (mine_possible, safe_possible) {
            (true, true) => DeducedState::Undetermined,
            (true, false) => DeducedState::ForcedMine,
            (false, true) => DeducedState::ForcedSafe,
            (false, false) => anyhow::bail!("state_collision at {point}"),
        };
        deductions.insert(point, state);
    }

    Ok(deductions)
}

fn exactly(formula: &mut CnfFormula, solver: &mut Solver, lits: &[Lit], k: usize) {
    at_most(formula, solver, lits, k);

    if k > lits.len() {
        formula.add_clause(&[]);
        return;
    }
    // At least k true is at most n - k false.
    let negated: Vec<Lit> = lits.iter().map(|&lit| !lit).collect();
    at_most(formula, solver, &negated, lits.len() - k);
}

fn at_most(formula: &mut CnfFormula, solver: &mut Solver, lits: &[Lit], k: usize) {
    if k >= lits.len() {
        return;
    }
    if k == 0 {
        for &lit in lits {
            formula.add_clause(&[!lit]);
        }
        return;
    }

    if lits.len() <= NAIVE_LIMIT {
        // No k + 1 of them may hold together.
        for combo in lits.iter().copied().combinations(k + 1) {
            let clause: Vec<Lit> = combo.into_iter().map(|lit| !lit).collect();
            formula.add_clause(&clause);
        }
    } else {
        sequential_counter(formula, solver, lits, k);
    }
}

/// Sinz's sequential counter: `count[i][j]` holds when at least `j + 1` of
/// `lits[..=i]` are true, and the `(k + 1)`th true literal is forbidden.
fn sequential_counter(formula: &mut CnfFormula, solver: &mut Solver, lits: &[Lit], k: usize) {
    let count: Vec<Vec<Lit>> = (0..lits.len())
        .map(|_| (0..k).map(|_| Lit::from_var(solver.new_var(), true)).collect())
        .collect();

    formula.add_clause(&[!lits[0], count[0][0]]);
    for j in 1..k {
        formula.add_clause(&[!count[0][j]]);
    }

    for i in 1..lits.len() {
        formula.add_clause(&[!lits[i], count[i][0]]);
        formula.add_clause(&[!count[i - 1][0], count[i][0]]);
        for j in 1..k {
            formula.add_clause(&[!lits[i], !count[i - 1][j - 1], count[i][j]]);
            formula.add_clause(&[!count[i - 1][j], count[i][j]]);
        }
        formula.add_clause(&[!lits[i], !count[i - 1][k - 1]]);
    }
}
