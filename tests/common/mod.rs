#![allow(dead_code)]

use movie_catalog::domain::entities::{Movie, Runtime};
use movie_catalog::domain::repositories::MovieStorage;

pub fn genres(names: &[&str]) -> Vec<String> {
    names.iter().map(|g| g.to_string()).collect()
}

pub fn casablanca() -> Movie {
    Movie::new("Casablanca", 1942, Runtime(102), genres(&["drama", "romance"]))
}

pub fn sample_movies() -> Vec<Movie> {
    vec![
        casablanca(),
        Movie::new("Black Panther", 2018, Runtime(134), genres(&["action", "adventure"])),
        Movie::new("Deadpool", 2016, Runtime(108), genres(&["action", "comedy"])),
        Movie::new("The Breakfast Club", 1985, Runtime(96), genres(&["drama"])),
        Movie::new("Moana", 2016, Runtime(107), genres(&["animation", "adventure"])),
    ]
}

/// Inserts every sample movie and returns them with assigned ids.
pub async fn seed<S: MovieStorage + ?Sized>(storage: &S) -> Vec<Movie> {
    let mut stored = Vec::new();
    for mut movie in sample_movies() {
        storage.insert(&mut movie).await.unwrap();
        stored.push(movie);
    }
    stored
}
