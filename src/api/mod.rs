use rocket::Route;

mod actions;
mod polls;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(actions::routes());
    routes.extend(polls::routes());
    routes
}
