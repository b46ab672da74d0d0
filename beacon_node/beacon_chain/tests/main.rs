mod committees;
