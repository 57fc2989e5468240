//! Derivative-free minimisation with the Nelder-Mead simplex method

/// Settings for [`nelder_mead`]
#[derive(Debug, Clone)]
pub struct SimplexOptions {
    pub max_iterations: usize,
    /// Relative spread of objective values at which the search stops
    pub tolerance: f64,
    /// Offset applied to each coordinate when building the starting simplex
    pub initial_step: f64,
}

impl Default for SimplexOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-8,
            initial_step: 0.1,
        }
    }
}

/// Result of a simplex search
#[derive(Debug, Clone)]
pub struct Minimum {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Minimise `objective` starting from `start`.
///
/// The objective may return `f64::INFINITY` to mark a point as infeasible;
/// such vertices are always ranked worst. Reaching `max_iterations` is not an
/// error, the caller decides what to do with `converged == false`.
pub fn nelder_mead<F>(objective: F, start: &[f64], options: &SimplexOptions) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let dim = start.len();
    if dim == 0 {
        return Minimum {
            point: Vec::new(),
            value: objective(start),
            iterations: 0,
            converged: true,
        };
    }

    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_nan() {
            f64::INFINITY
        } else {
            v
        }
    };

    let mut simplex: Vec<Vec<f64>> = std::iter::once(start.to_vec())
        .chain((0..dim).map(|i| {
            let mut vertex = start.to_vec();
            vertex[i] += options.initial_step;
            vertex
        }))
        .collect();
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < options.max_iterations {
        iterations += 1;

        let mut order: Vec<usize> = (0..=dim).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let best = values[0];
        let worst = values[dim];
        if best.is_finite()
            && worst.is_finite()
            && (worst - best) <= options.tolerance * (1.0 + best.abs())
        {
            converged = true;
            break;
        }

        let centroid: Vec<f64> = (0..dim)
            .map(|j| simplex[..dim].iter().map(|v| v[j]).sum::<f64>() / dim as f64)
            .collect();
        let towards = |from: &[f64], coef: f64| -> Vec<f64> {
            centroid
                .iter()
                .zip(from)
                .map(|(c, x)| c + coef * (x - c))
                .collect()
        };

        let reflected = towards(&simplex[dim], -REFLECT);
        let reflected_value = eval(&reflected);

        if reflected_value < best {
            let expanded = towards(&simplex[dim], -REFLECT * EXPAND);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[dim] = expanded;
                values[dim] = expanded_value;
            } else {
                simplex[dim] = reflected;
                values[dim] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[dim - 1] {
            simplex[dim] = reflected;
            values[dim] = reflected_value;
            continue;
        }

        let (candidate, threshold) = if reflected_value < worst {
            (towards(&reflected, CONTRACT), reflected_value)
        } else {
            (towards(&simplex[dim], CONTRACT), worst)
        };
        let candidate_value = eval(&candidate);

        if candidate_value < threshold || (candidate_value == threshold && threshold.is_finite()) {
            simplex[dim] = candidate;
            values[dim] = candidate_value;
            continue;
        }

        let anchor = simplex[0].clone();
        for i in 1..=dim {
            simplex[i] = anchor
                .iter()
                .zip(&simplex[i])
                .map(|(a, x)| a + SHRINK * (x - a))
                .collect();
            values[i] = eval(&simplex[i]);
        }
    }

    let (best_idx, _) = values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .unwrap_or((0, &values[0]));

    Minimum {
        point: simplex[best_idx].clone(),
        value: values[best_idx],
        iterations,
        converged,
    }
}
