/// Cosine similarity of two embeddings, accumulated in `f64`
///
/// Not clamped: opposite vectors score -1.0. Mismatched lengths, empty
/// vectors and zero vectors all score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| (f64::from(x), f64::from(y)))
        .fold((0.0_f64, 0.0_f64, 0.0_f64), |(dot, norm_a, norm_b), (x, y)| {
            (dot + x * y, norm_a + x * x, norm_b + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}
