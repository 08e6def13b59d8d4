/// Viterbi lattice of one sentence.
///
/// State id 0 is `START`; the implicit column before the first item holds
/// `START` alone with log-probability 0.
#[derive(Debug, Clone)]
pub struct Trellis {
    /// The number of states (L), `START` included.
    num_states: usize,
    /// The number of items (T) in the sentence.
    num_items: usize,
    /**
     * Best scores.
     *  This is a [T][L] matrix whose element [t][j] is the best log-probability
     *  of any path arriving at state #j after emitting item #t.
     */
    score: Vec<f64>,
    /**
     * Backward edges.
     *  This is a [T][L] matrix whose element [t][j] is the state #i at t-1
     *  that yields the best score at (t, j). For t = 0 it is `START`.
     */
    backward_edge: Vec<usize>,
    /// Symbol emitted at each position (word or pseudo-word).
    symbols: Vec<String>,
}

pub const START_ID: usize = 0;

impl Trellis {
    pub(crate) fn new(num_states: usize, symbols: Vec<String>) -> Self {
        let num_items = symbols.len();
        Self {
            num_states,
            num_items,
            score: vec![f64::NEG_INFINITY; num_states * num_items],
            backward_edge: vec![START_ID; num_states * num_items],
            symbols,
        }
    }

    pub fn len(&self) -> usize {
        self.num_items
    }

    pub fn is_empty(&self) -> bool {
        self.num_items == 0
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// Scores of all states at position `t`.
    pub fn column(&self, t: usize) -> &[f64] {
        let l = self.num_states;
        &self.score[l * t..l * (t + 1)]
    }

    pub fn backward_edge(&self, t: usize, j: usize) -> usize {
        self.backward_edge[self.num_states * t + j]
    }

    pub fn symbol(&self, t: usize) -> &str {
        &self.symbols[t]
    }

    /// Fills the lattice. `trans(i, j)` and `emit(j, symbol)` are
    /// log-probabilities, -inf where the model has no entry.
    ///
    /// Ties go to the lower state id.
    pub(crate) fn viterbi<T, E>(&mut self, trans: T, emit: E)
    where
        T: Fn(usize, usize) -> f64,
        E: Fn(usize, &str) -> f64,
    {
        let l = self.num_states;
        if self.num_items == 0 {
            return;
        }

        /* Compute the scores at (0, *): the only predecessor is START. */
        for j in 0..l {
            self.score[j] = trans(START_ID, j) + emit(j, &self.symbols[0]);
            self.backward_edge[j] = START_ID;
        }

        /* Compute the scores at (t, *). */
        for t in 1..self.num_items {
            for j in 0..l {
                let prev = &self.score[l * (t - 1)..l * t];
                let mut max_score = prev[0] + trans(0, j);
                let mut argmax_score = 0;
                for (i, &p) in prev.iter().enumerate().skip(1) {
                    /* Transit from (t-1, i) to (t, j). */
                    let score = p + trans(i, j);
                    if max_score < score {
                        max_score = score;
                        argmax_score = i;
                    }
                }
                self.backward_edge[l * t + j] = argmax_score;
                self.score[l * t + j] = max_score + emit(j, &self.symbols[t]);
            }
        }
    }

    /// Best final state, its score and the state path leading to it.
    pub fn best_path(&self) -> (f64, Vec<usize>) {
        let t_len = self.num_items;
        if t_len == 0 {
            return (0.0, Vec::new());
        }
        let last = self.column(t_len - 1);
        let mut max_score = last[0];
        let mut best = 0;
        for (i, &score) in last.iter().enumerate().skip(1) {
            if max_score < score {
                max_score = score;
                best = i;
            }
        }

        /* Tag labels by tracing the backward links. */
        let mut labels = vec![0; t_len];
        labels[t_len - 1] = best;
        for t in (0..t_len - 1).rev() {
            labels[t] = self.backward_edge(t + 1, labels[t + 1]);
        }
        (max_score, labels)
    }
}
