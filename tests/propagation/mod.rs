mod events;
mod keplerian;
mod maneuvers;
