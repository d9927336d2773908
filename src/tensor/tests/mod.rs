mod new;
mod property;
