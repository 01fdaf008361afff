use criterion::{criterion_group, criterion_main, Criterion};
use skillswap_api::models::{Skill, SkillCategory, SkillLevel, User};
use skillswap_api::services::matching::{rank_matches, rank_suggestions, search};
use std::hint::black_box;

const SKILLS: &[&str] = &[
    "Guitar", "Spanish", "Piano", "French", "Cooking", "Python", "Rust", "Chess", "Yoga",
    "Photography", "Drawing", "Marketing",
];

fn skill(name: &str) -> Skill {
    Skill {
        id: name.to_lowercase(),
        name: name.to_string(),
        category: SkillCategory::Other,
        level: SkillLevel::Intermediate,
        years_of_experience: None,
        description: None,
        added_at: "2024-01-01T00:00:00.000Z".to_string(),
    }
}

/// Deterministic population where roughly one user in six is a mutual match.
fn population(size: usize) -> Vec<User> {
    (0..size)
        .map(|i| {
            let mut user = User::new(
                &format!("user-{}", i),
                &format!("user{}@example.com", i),
                &format!("User {}", i),
                "2024-01-01T00:00:00.000Z",
            );
            user.skills_i_teach = vec![
                skill(SKILLS[i % SKILLS.len()]),
                skill(SKILLS[(i + 3) % SKILLS.len()]),
            ];
            user.skills_i_want_to_learn = vec![skill(SKILLS[(i + 1) % SKILLS.len()])];
            user.prefer_online = i % 2 == 0;
            user.prefer_offline = i % 2 == 1;
            user.location = Some(if i % 4 < 2 { "Lisbon" } else { "Porto" }.to_string());
            user.average_rating = (i % 5) as f64 + 0.5;
            user.is_onboarding_complete = true;
            user
        })
        .collect()
}

fn benchmark_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");

    for size in [100, 1_000, 10_000] {
        let users = population(size);
        let me = &users[0];

        group.bench_function(format!("rank_matches_{}", size), |b| {
            b.iter(|| rank_matches(black_box(me), black_box(&users)))
        });
        group.bench_function(format!("rank_suggestions_{}", size), |b| {
            b.iter(|| rank_suggestions(black_box(me), black_box(&users), 10))
        });
        group.bench_function(format!("search_{}", size), |b| {
            b.iter(|| search(black_box("pho"), black_box(&users)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_matching);
criterion_main!(benches);
